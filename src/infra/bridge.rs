//! # Node Bridge Module / Node 桥接模块
//!
//! Drives a headless browser and the pa11y audit engine through a long-lived
//! Node process. The process runs an embedded script and speaks
//! newline-delimited JSON over its stdin and stdout: one request
//! `{"id", "op", ...}` per line, one reply `{"id", "ok", "result" | "error"}`
//! per line.
//!
//! 通过一个长生命周期的 Node 进程驱动无头浏览器和 pa11y 审计引擎。
//! 该进程运行内嵌脚本，并通过 stdin/stdout 以换行分隔的 JSON 通信：
//! 每行一个请求 `{"id", "op", ...}`，每行一个回复 `{"id", "ok", "result" | "error"}`。
//!
//! ## Ordering / 顺序
//!
//! The connection sits behind an async mutex and a request is answered before
//! the next one is written, so at most one browser operation is ever in flight.
//!
//! 连接位于异步互斥锁之后，且每个请求在写入下一个请求之前得到回复，
//! 因此同一时间最多只有一个浏览器操作在进行。

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::core::error::{CvdError, CvdResult};
use crate::core::models::{DisplayMode, Issue, Standard};
use crate::infra::browser::{AuditEngine, BrowserPage, BrowserSession};

const BRIDGE_SCRIPT: &str = include_str!("assets/bridge.js");

/// How long the bridge gets to exit after a shutdown request.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Settings for launching the bridge process.
/// 启动桥接进程的设置。
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Program that runs JavaScript, usually `node`.
    pub program: String,
    /// Arguments placed before `-e <script>`.
    pub args: Vec<String>,
    /// Directory in which `puppeteer` and `pa11y` are resolved.
    pub working_dir: PathBuf,
    pub headless: bool,
    /// Extra browser launch arguments.
    pub launch_args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Request<'a> {
    Launch { headless: bool, args: &'a [String] },
    NewPage,
    EmulateColorScheme { page: u64, scheme: &'a str },
    Goto { page: u64, url: &'a str },
    FirstStyle { page: u64 },
    ReplaceFirstStyle { page: u64, css: &'a str },
    Content { page: u64 },
    Screenshot { page: u64, path: &'a str },
    Audit { page: u64, url: &'a str, standard: &'a str },
    ClosePage { page: u64 },
    Shutdown,
}

#[derive(Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    request: &'a Request<'a>,
}

#[derive(Debug, Deserialize)]
struct Response {
    /// `null` when the bridge could not read the request at all.
    id: Option<u64>,
    ok: bool,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

struct Channel {
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

/// Request/response channel to the bridge process, shared by the session and its pages.
/// 与桥接进程的请求/响应通道，由会话及其页面共享。
struct BridgeConnection {
    channel: Mutex<Channel>,
}

impl BridgeConnection {
    async fn call<R: DeserializeOwned>(&self, request: Request<'_>) -> CvdResult<R> {
        let mut guard = self.channel.lock().await;
        let channel = &mut *guard;

        channel.next_id += 1;
        let id = channel.next_id;

        let mut line = serde_json::to_string(&Envelope { id, request: &request })?;
        line.push('\n');
        channel.stdin.write_all(line.as_bytes()).await?;
        channel.stdin.flush().await?;

        loop {
            let Some(line) = channel.lines.next_line().await? else {
                return Err(CvdError::Bridge(format!(
                    "bridge process exited while handling {}",
                    op_name(&request)
                )));
            };

            // Libraries may log to stdout; only JSON objects are replies.
            let trimmed = line.trim();
            if !trimmed.starts_with('{') {
                continue;
            }
            let Ok(response) = serde_json::from_str::<Response>(trimmed) else {
                continue;
            };
            if response.id.is_some_and(|reply_id| reply_id != id) {
                continue;
            }

            if !response.ok {
                let message = response
                    .error
                    .unwrap_or_else(|| "unknown bridge error".to_string());
                return Err(CvdError::Bridge(format!("{}: {}", op_name(&request), message)));
            }
            return Ok(serde_json::from_value(response.result)?);
        }
    }
}

fn op_name(request: &Request<'_>) -> &'static str {
    match request {
        Request::Launch { .. } => "launch",
        Request::NewPage => "newPage",
        Request::EmulateColorScheme { .. } => "emulateColorScheme",
        Request::Goto { .. } => "goto",
        Request::FirstStyle { .. } => "firstStyle",
        Request::ReplaceFirstStyle { .. } => "replaceFirstStyle",
        Request::Content { .. } => "content",
        Request::Screenshot { .. } => "screenshot",
        Request::Audit { .. } => "audit",
        Request::ClosePage { .. } => "closePage",
        Request::Shutdown => "shutdown",
    }
}

/// A browser session hosted by a Node bridge process.
/// 由 Node 桥接进程托管的浏览器会话。
pub struct NodeBridge {
    child: Child,
    connection: Arc<BridgeConnection>,
}

impl NodeBridge {
    /// Spawns the bridge and launches the browser inside it.
    ///
    /// The child is killed if this handle is dropped without [`BrowserSession::close`].
    ///
    /// 派生桥接进程并在其中启动浏览器。
    /// 如果此句柄在未调用 [`BrowserSession::close`] 的情况下被丢弃，子进程会被终止。
    pub async fn launch(options: &BridgeOptions) -> CvdResult<Self> {
        let mut child = Command::new(&options.program)
            .args(&options.args)
            .arg("-e")
            .arg(BRIDGE_SCRIPT)
            .current_dir(&options.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CvdError::Bridge(format!("failed to start '{}': {}", options.program, e))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(CvdError::Bridge("bridge stdio is not piped".to_string()));
        };

        let connection = Arc::new(BridgeConnection {
            channel: Mutex::new(Channel {
                stdin,
                lines: BufReader::new(stdout).lines(),
                next_id: 0,
            }),
        });

        let _: IgnoredAny = connection
            .call(Request::Launch {
                headless: options.headless,
                args: &options.launch_args,
            })
            .await?;

        Ok(Self { child, connection })
    }
}

impl BrowserSession for NodeBridge {
    type Page = BridgePage;

    async fn new_page(&self) -> CvdResult<BridgePage> {
        let id: u64 = self.connection.call(Request::NewPage).await?;
        Ok(BridgePage {
            id,
            connection: Arc::clone(&self.connection),
        })
    }

    async fn close(mut self) -> CvdResult<()> {
        let shutdown: CvdResult<IgnoredAny> = self.connection.call(Request::Shutdown).await;

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(status) => {
                status?;
            }
            Err(_) => {
                self.child.kill().await?;
            }
        }

        shutdown.map(|_| ())
    }
}

/// A page opened through [`NodeBridge`].
pub struct BridgePage {
    id: u64,
    connection: Arc<BridgeConnection>,
}

impl BrowserPage for BridgePage {
    async fn emulate_color_scheme(&self, mode: DisplayMode) -> CvdResult<()> {
        let _: IgnoredAny = self
            .connection
            .call(Request::EmulateColorScheme {
                page: self.id,
                scheme: mode.as_str(),
            })
            .await?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> CvdResult<()> {
        let _: IgnoredAny = self
            .connection
            .call(Request::Goto { page: self.id, url })
            .await?;
        Ok(())
    }

    async fn first_style_text(&self) -> CvdResult<Option<String>> {
        self.connection.call(Request::FirstStyle { page: self.id }).await
    }

    async fn replace_first_style(&self, css: &str) -> CvdResult<bool> {
        self.connection
            .call(Request::ReplaceFirstStyle { page: self.id, css })
            .await
    }

    async fn content(&self) -> CvdResult<String> {
        self.connection.call(Request::Content { page: self.id }).await
    }

    async fn screenshot(&self, path: &Path) -> CvdResult<()> {
        let path = path.to_string_lossy();
        let _: IgnoredAny = self
            .connection
            .call(Request::Screenshot {
                page: self.id,
                path: &path,
            })
            .await?;
        Ok(())
    }

    async fn close(self) -> CvdResult<()> {
        let _: IgnoredAny = self
            .connection
            .call(Request::ClosePage { page: self.id })
            .await?;
        Ok(())
    }
}

/// Runs pa11y inside the bridge against a page that is already open.
/// 在桥接进程中针对已打开的页面运行 pa11y。
#[derive(Debug, Clone, Copy, Default)]
pub struct Pa11yAudit;

impl AuditEngine<BridgePage> for Pa11yAudit {
    async fn audit(&self, target: &str, standard: Standard, page: &BridgePage) -> CvdResult<Vec<Issue>> {
        page.connection
            .call(Request::Audit {
                page: page.id,
                url: target,
                standard: standard.as_str(),
            })
            .await
    }
}

#[cfg(test)]
mod bridge_protocol_tests {
    use super::*;

    #[test]
    fn test_request_envelope_is_flat_and_camel_cased() {
        let request = Request::ReplaceFirstStyle { page: 3, css: "a{}" };
        let json = serde_json::to_value(Envelope { id: 7, request: &request }).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["op"], "replaceFirstStyle");
        assert_eq!(json["page"], 3);
        assert_eq!(json["css"], "a{}");
    }

    #[test]
    fn test_unit_request_carries_only_op_and_id() {
        let json = serde_json::to_value(Envelope { id: 1, request: &Request::NewPage }).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "op": "newPage" }));
    }

    #[test]
    fn test_error_reply_without_id_parses() {
        let response: Response =
            serde_json::from_str(r#"{"id":null,"ok":false,"error":"invalid request"}"#).unwrap();
        assert!(response.id.is_none());
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("invalid request"));
    }

    #[test]
    fn test_audit_reply_maps_to_issues() {
        let response: Response = serde_json::from_str(
            r#"{"id":2,"ok":true,"result":[{"code":"WCAG2AAA.Principle1.Guideline1_4.1_4_6.G17.Fail","message":"contrast","context":"<p>x</p>","selector":"p","type":"error"}]}"#,
        )
        .unwrap();
        let issues: Vec<Issue> = serde_json::from_value(response.result).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].selector, "p");
        assert_eq!(issues[0].kind.as_deref(), Some("error"));
    }
}
