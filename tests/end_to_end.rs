#![cfg(unix)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pushvisor::{Config, Event, EventKind, Phase, ShutdownSignal, Subscribe, Supervisor};

#[derive(Default)]
struct Collect(Mutex<Vec<Event>>);

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, e: &Event) {
        self.0.lock().unwrap().push(e.clone());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pushes_to_every_destination_until_interrupted() {
    let dir = tempfile::tempdir().unwrap();
    let marks = dir.path().join("marks");
    std::fs::create_dir(&marks).unwrap();

    let list = dir.path().join("rtmp.txt");
    let mut f = std::fs::File::create(&list).unwrap();
    writeln!(f, "  rtmp://one/live  \n\nrtmp://two/live").unwrap();
    drop(f);

    // Each fake encoder records the source and destination it was given, then idles.
    let script = format!(
        r#"printf '%s\n%s\n' "$4" "${{13}}" > "{}/$$"; exec sleep 30"#,
        marks.display()
    );
    let cfg = Config {
        stagger: Duration::from_millis(50),
        grace: Duration::from_secs(5),
        encoder: PathBuf::from("/bin/sh"),
        encoder_args: vec!["-c".into(), script.into()],
        ..Config::default()
    };
    let collect = Arc::new(Collect::default());
    let sup = Supervisor::new(cfg, vec![collect.clone() as Arc<dyn Subscribe>]);

    let mut phase = sup.watch_phase();
    let shutdown = async move {
        let _ = phase.wait_for(|p| *p == Phase::WaitingForSignal).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok::<_, std::io::Error>(ShutdownSignal::Terminate)
    };

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        sup.run_until(&list, "clip.mp4", shutdown),
    )
    .await
    .expect("run finishes")
    .expect("run succeeds");

    assert_eq!(summary.launched(), 2);

    let mut seen: Vec<String> = std::fs::read_dir(&marks)
        .unwrap()
        .map(|e| std::fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    seen.sort();
    assert_eq!(
        seen,
        [
            "clip.mp4\nrtmp://one/live\n".to_string(),
            "clip.mp4\nrtmp://two/live\n".to_string()
        ]
    );

    let events = collect.0.lock().unwrap().clone();
    let requested = events
        .iter()
        .find(|e| e.kind == EventKind::ShutdownRequested)
        .expect("shutdown requested");
    assert_eq!(requested.reason.as_deref(), Some("terminated"));
    assert_eq!(
        events
            .iter()
            .filter(|e| e.kind == EventKind::WorkerStopped)
            .count(),
        2
    );
    assert!(events.iter().any(|e| e.kind == EventKind::AllStoppedWithin));
}
