//! Line-delimited JSON-RPC transport over any async byte stream (stdio in production).

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::api::mcp::Dispatcher;
use crate::core::mcp::{internal_error, RpcResp};

/// Read one request per line, answer one response per line, flush after each.
/// Blank lines are skipped; end of input ends the loop cleanly.
/// A line that is not UTF-8 is answered like any other unreadable request.
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let resp = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => dispatcher.handle_line(line.trim_end_matches(['\n', '\r'])).await,
            Err(e) => undecodable(e),
        };
        write_line(&mut writer, &resp).await?;
    }
    tracing::info!("end of input");
    Ok(())
}

fn undecodable(e: std::str::Utf8Error) -> RpcResp {
    tracing::warn!(error = %e, "request line is not valid UTF-8");
    internal_error(serde_json::Value::Null, e.to_string())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, resp: &RpcResp) -> std::io::Result<()> {
    let mut out = serde_json::to_vec(resp).map_err(std::io::Error::other)?;
    out.push(b'\n');
    writer.write_all(&out).await?;
    writer.flush().await
}

pub async fn serve_stdio(dispatcher: &Dispatcher) -> std::io::Result<()> {
    tracing::info!("mode=stdio");
    serve_lines(dispatcher, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::{ApiConfig, Config};
    use serde_json::Value;

    fn dispatcher() -> Dispatcher {
        let cfg = Config::with_api(ApiConfig::new("http://127.0.0.1:9", "k", "u1"));
        Dispatcher::from_config(cfg).unwrap()
    }

    async fn run(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let mut out = Vec::new();
        serve_lines(&dispatcher(), input, &mut out).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn answers_each_line_and_skips_blanks() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
            "\n\n   \n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );
        let out = run(input).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["id"], 1);
        assert_eq!(out[1]["id"], 2);
    }

    #[tokio::test]
    async fn parse_failure_does_not_stop_the_loop() {
        let input = "garbage\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"prompts/list\"}";
        let out = run(input).await;
        assert_eq!(out.len(), 2);
        assert!(out[0]["id"].is_null());
        assert_eq!(out[0]["error"]["code"], -32603);
        assert_eq!(out[1]["id"], 7);
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_answered_and_the_loop_continues() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":7,"method":"prompts/list"}"#);
        input.push(b'\n');
        let out = run_bytes(&input).await;
        assert_eq!(out.len(), 2);
        assert!(out[0]["id"].is_null());
        assert_eq!(out[0]["error"]["code"], -32603);
        assert_eq!(out[1]["id"], 7);
        assert_eq!(out[1]["result"]["prompts"][0]["name"], "pitch");
    }

    #[tokio::test]
    async fn crlf_line_endings_are_accepted() {
        let out = run("{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"initialize\"}\r\n").await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 3);
    }

    #[tokio::test]
    async fn empty_input_ends_cleanly() {
        assert!(run("").await.is_empty());
    }
}
