use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lighthouse_batch::models::{AuditResult, CategoryResult};
use lighthouse_batch::{
    App, AuditEngine, AuditSettings, BrowserLauncher, BrowserSession, Config, InputError,
    LighthouseReport, RunSummary, TaskError,
};
use tempfile::TempDir;

// ========== 测试用的浏览器和审计引擎 ==========

struct FakeSession {
    open_sessions: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    fn debug_port(&self) -> u16 {
        9222
    }

    async fn close(self: Box<Self>) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeLauncher {
    open_sessions: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, TaskError> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            open_sessions: Arc::clone(&self.open_sessions),
        }))
    }
}

/// 按 URL 决定行为：
/// - 含 `slow`：返回 `{message: timeout}` 错误
/// - 含 `crash-always`：每次都 panic
/// - 含 `crash-once`：第一次 panic，之后成功
/// - 其他：成功，耗时随 URL 变化，制造乱序完成
#[derive(Default)]
struct FakeEngine {
    running: AtomicUsize,
    peak_running: AtomicUsize,
    calls: AtomicUsize,
    crashed_once: Mutex<HashSet<String>>,
}

#[async_trait]
impl AuditEngine for FakeEngine {
    async fn audit(
        &self,
        url: &str,
        _debug_port: u16,
        settings: &AuditSettings,
    ) -> Result<LighthouseReport, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(now, Ordering::SeqCst);

        let delay = 5 + (url.len() % 7) as u64 * 3;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        if url.contains("crash-always") {
            panic!("simulated worker crash for {url}");
        }
        if url.contains("crash-once") && self.crashed_once.lock().unwrap().insert(url.to_string()) {
            panic!("simulated worker crash for {url}");
        }
        if url.contains("slow") {
            return Err(TaskError::Reported {
                fields: vec![("message".to_string(), "timeout".to_string())],
            });
        }

        let mut report = LighthouseReport::default();
        report.categories.insert(
            "performance".to_string(),
            CategoryResult {
                title: "Performance".to_string(),
                score: Some(0.5),
            },
        );
        report.audits.insert(
            "interactive".to_string(),
            AuditResult {
                display_value: Some(format!("{} 3.2 s", settings.emulated_form_factor)),
                ..Default::default()
            },
        );
        Ok(report)
    }
}

// ========== 辅助函数 ==========

struct Fixture {
    dir: TempDir,
    launcher: Arc<FakeLauncher>,
    engine: Arc<FakeEngine>,
}

impl Fixture {
    fn new(input: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("input.csv"), input).unwrap();
        Self {
            dir,
            launcher: Arc::new(FakeLauncher::default()),
            engine: Arc::new(FakeEngine::default()),
        }
    }

    fn config(&self, max_workers: usize) -> Config {
        Config {
            input_file: self.dir.path().join("input.csv"),
            output_dir: self.dir.path().join("output"),
            error_log_dir: self.dir.path().join("errorLog"),
            max_workers,
            ..Config::default()
        }
    }

    async fn run(&self, max_workers: usize) -> anyhow::Result<RunSummary> {
        let launcher: Arc<dyn BrowserLauncher> = self.launcher.clone();
        let engine: Arc<dyn AuditEngine> = self.engine.clone();
        App::with_collaborators(self.config(max_workers), launcher, engine)?
            .run()
            .await
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn input_with(urls: &[(&str, &str)]) -> String {
    let mut input = String::from("Device,URL\n");
    for (device, url) in urls {
        input.push_str(&format!("{},{}\n", device, url));
    }
    input
}

// ========== 测试 ==========

#[tokio::test]
async fn test_two_tasks_two_workers() {
    let fixture = Fixture::new("Device,URL\nmobile,https://example.com\ndesktop,https://example.org");
    let summary = fixture.run(2).await.unwrap();

    let stats = &summary.statistics;
    assert_eq!(stats.total_tasks, 2);
    assert_eq!(stats.dispatched, 2);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(fixture.engine.calls.load(Ordering::SeqCst), 2);

    let rows = read_rows(&summary.report_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][..3], &["Device", "URL", "Performance"]);

    let mut urls: Vec<&str> = rows[1..].iter().map(|r| r[1].as_str()).collect();
    urls.sort();
    assert_eq!(urls, vec!["https://example.com", "https://example.org"]);

    for row in &rows[1..] {
        assert_eq!(row.len(), rows[0].len());
        assert_eq!(row[2], "0.5");
        let interactive = rows[0].iter().position(|h| h == "Time to Interactive").unwrap();
        assert_eq!(row[interactive], format!("3.2 s ({} )", row[0]));
    }

    assert!(read_rows(&summary.error_log_path).is_empty());
    assert_eq!(fixture.launcher.open_sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failures_go_to_error_log_only() {
    let fixture = Fixture::new(&input_with(&[
        ("mobile", "https://a.example"),
        ("mobile", "https://slow.example"),
        ("desktop", "https://b.example"),
        ("desktop", "https://slow.example/2"),
        ("mobile", "https://c.example"),
        ("desktop", "https://d.example"),
    ]));
    let summary = fixture.run(4).await.unwrap();

    let stats = &summary.statistics;
    assert_eq!(stats.succeeded, 4);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.succeeded + stats.failed, stats.total_tasks);

    let report_rows = read_rows(&summary.report_path);
    assert_eq!(report_rows.len(), 1 + 4);
    assert!(report_rows[1..].iter().all(|r| !r[1].contains("slow")));

    let error_rows = read_rows(&summary.error_log_path);
    assert_eq!(error_rows.len(), 2);
    assert!(error_rows.contains(&vec![
        "mobile".to_string(),
        "https://slow.example".to_string(),
        "message".to_string(),
        "timeout".to_string(),
    ]));
    assert_eq!(fixture.launcher.open_sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pool_never_exceeds_max_workers() {
    let urls: Vec<String> = (0..20).map(|i| format!("https://site{}.example/{}", i, "x".repeat(i))).collect();
    let pairs: Vec<(&str, &str)> = urls.iter().map(|u| ("mobile", u.as_str())).collect();
    let fixture = Fixture::new(&input_with(&pairs));

    let summary = fixture.run(3).await.unwrap();
    let stats = &summary.statistics;

    assert_eq!(stats.succeeded, 20);
    assert_eq!(stats.dispatched, 20);
    assert_eq!(stats.workers_spawned, 3);
    assert!(stats.peak_workers <= 3);
    assert!(fixture.engine.peak_running.load(Ordering::SeqCst) <= 3);
    assert_eq!(read_rows(&summary.report_path).len(), 21);
}

#[tokio::test]
async fn test_crashed_task_is_requeued_and_pool_replenished() {
    let fixture = Fixture::new(&input_with(&[
        ("mobile", "https://a.example"),
        ("mobile", "https://crash-once.example"),
        ("desktop", "https://b.example"),
        ("desktop", "https://c.example"),
    ]));
    let summary = fixture.run(2).await.unwrap();

    let stats = &summary.statistics;
    assert_eq!(stats.worker_crashes, 1);
    assert_eq!(stats.requeued, 1);
    assert_eq!(stats.succeeded, 4);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.dispatched, 5);
    assert!(stats.workers_spawned >= 3);
    assert!(stats.peak_workers <= 2);

    let rows = read_rows(&summary.report_path);
    assert_eq!(rows.len(), 5);
    assert_eq!(
        rows.iter().filter(|r| r[1] == "https://crash-once.example").count(),
        1
    );
    assert_eq!(fixture.launcher.open_sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_task_crashing_every_time_is_recorded_as_failure() {
    let fixture = Fixture::new(&input_with(&[
        ("mobile", "https://crash-always.example"),
        ("desktop", "https://ok.example"),
    ]));
    let summary = fixture.run(1).await.unwrap();

    let stats = &summary.statistics;
    assert_eq!(stats.worker_crashes, 2);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.succeeded + stats.failed, stats.total_tasks);
    assert!(stats.peak_workers <= 1);

    let error_rows = read_rows(&summary.error_log_path);
    assert_eq!(
        error_rows,
        vec![vec![
            "mobile".to_string(),
            "https://crash-always.example".to_string(),
            "error".to_string(),
            "worker crashed".to_string(),
            "attempts".to_string(),
            "2".to_string(),
        ]]
    );
    assert_eq!(fixture.launcher.open_sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_browser_released_when_worker_crashes_mid_audit() {
    let fixture = Fixture::new(&input_with(&[
        ("mobile", "https://crash-once.example"),
        ("desktop", "https://ok.example"),
    ]));
    let summary = fixture.run(1).await.unwrap();

    let stats = &summary.statistics;
    assert_eq!(stats.worker_crashes, 1);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 0);
    // 崩溃那次 + 重试 + 第二个任务，每次都启动了自己的浏览器
    assert_eq!(fixture.engine.calls.load(Ordering::SeqCst), 3);
    assert_eq!(fixture.launcher.open_sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_input_writes_header_only() {
    let fixture = Fixture::new("Device,URL\n\n");
    let summary = fixture.run(4).await.unwrap();

    assert_eq!(summary.statistics.total_tasks, 0);
    assert_eq!(summary.statistics.workers_spawned, 0);
    assert_eq!(read_rows(&summary.report_path).len(), 1);
    assert!(summary.error_log_path.exists());
}

#[tokio::test]
async fn test_missing_input_aborts_before_output() {
    let fixture = Fixture::new("");
    std::fs::remove_file(fixture.dir.path().join("input.csv")).unwrap();

    let err = fixture.run(2).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::Unreadable { .. })
    ));
    assert!(!fixture.dir.path().join("output").exists());
    assert_eq!(fixture.engine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_input_is_fatal() {
    let fixture = Fixture::new("Device,URL\nmobile,https://a.example,oops\n");
    let err = fixture.run(2).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::Malformed { .. })
    ));
    assert_eq!(fixture.engine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[ignore] // 需要本机安装 Chrome 和 lighthouse 命令行：cargo test -- --ignored
async fn test_real_lighthouse_run() {
    lighthouse_batch::logger::init();

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("input.csv"),
        "Device,URL\ndesktop,https://example.com\n",
    )
    .unwrap();

    let config = Config {
        input_file: dir.path().join("input.csv"),
        output_dir: dir.path().join("output"),
        error_log_dir: dir.path().join("errorLog"),
        max_workers: 1,
        ..Config::from_env()
    };

    let summary = App::initialize(config).unwrap().run().await.unwrap();
    assert_eq!(summary.statistics.succeeded + summary.statistics.failed, 1);
}
