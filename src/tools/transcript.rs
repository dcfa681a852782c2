//! Group transcript export: render the group listing as Markdown on disk.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

use crate::core::error::ToolFailure;

/// Keys under which the group listing may carry its members.
const MEMBER_KEYS: &[&str] = &["users", "members"];

/// Attempts at a fresh file name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

pub async fn export(group_id: &str, body: &Value, scratch_dir: &Path) -> Result<Value, ToolFailure> {
    let now = Local::now();
    let (markdown, member_count) = render(group_id, body, now);

    let fail = |path: &Path, e: std::io::Error| ToolFailure::Export {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    tokio::fs::create_dir_all(scratch_dir).await.map_err(|e| fail(scratch_dir, e))?;
    let path = write_fresh(scratch_dir, group_id, now, markdown.as_bytes())
        .await
        .map_err(|(path, e)| fail(&path, e))?;
    tracing::info!(group_id, path = %path.display(), member_count, "group transcript written");

    Ok(json!({
        "group_id": group_id,
        "file_path": path.display().to_string(),
        "member_count": member_count,
        "bytes": markdown.len(),
        "message": "群组资料已写入本地文件，请读取该文件获取完整内容",
    }))
}

/// Write into a file that did not exist before, never replacing an earlier export.
async fn write_fresh(
    dir: &Path,
    group_id: &str,
    at: DateTime<Local>,
    bytes: &[u8],
) -> Result<PathBuf, (PathBuf, std::io::Error)> {
    let mut attempt = 0;
    loop {
        let path = transcript_path(dir, group_id, at, attempt);
        let opened = tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await;
        match opened {
            Ok(mut file) => {
                let written = async {
                    file.write_all(bytes).await?;
                    file.flush().await
                }
                .await;
                return written.map(|_| path.clone()).map_err(|e| (path, e));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt + 1 < MAX_NAME_ATTEMPTS => {
                attempt += 1;
            }
            Err(e) => return Err((path, e)),
        }
    }
}

fn transcript_path(dir: &Path, group_id: &str, at: DateTime<Local>, attempt: u32) -> PathBuf {
    let safe: String = group_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stamp = at.format("%Y%m%d_%H%M%S_%3f");
    match attempt {
        0 => dir.join(format!("group_{safe}_{stamp}.md")),
        n => dir.join(format!("group_{safe}_{stamp}_{n}.md")),
    }
}

/// Markdown text plus the number of members rendered.
pub fn render(group_id: &str, body: &Value, at: DateTime<Local>) -> (String, usize) {
    let mut out = String::new();
    let _ = writeln!(out, "# 群组 {group_id}\n");
    let _ = writeln!(out, "导出时间: {}\n", at.format("%Y-%m-%d %H:%M:%S"));

    let data = body.get("data").unwrap_or(body);
    let members = match data {
        Value::Array(items) => Some(items),
        Value::Object(map) => MEMBER_KEYS.iter().find_map(|k| map.get(*k).and_then(Value::as_array)),
        _ => None,
    };

    match data {
        Value::String(text) => {
            let _ = writeln!(out, "{text}");
        }
        Value::Object(map) => {
            let _ = writeln!(out, "## 群组信息\n");
            write_scalars(&mut out, map);
            out.push('\n');
        }
        _ => {}
    }

    let Some(members) = members else {
        if !matches!(data, Value::String(_) | Value::Object(_)) {
            let _ = writeln!(out, "```json\n{}\n```", serde_json::to_string_pretty(data).unwrap_or_default());
        }
        return (out, 0);
    };

    let _ = writeln!(out, "## 成员 ({})\n", members.len());
    for (i, member) in members.iter().enumerate() {
        let name = member.get("name").and_then(Value::as_str).unwrap_or("未命名");
        let _ = writeln!(out, "### {}. {name}\n", i + 1);
        match member {
            Value::Object(map) => write_scalars(&mut out, map),
            other => {
                let _ = writeln!(out, "{}", scalar_text(other));
            }
        }
        out.push('\n');
    }
    (out, members.len())
}

fn write_scalars(out: &mut String, map: &serde_json::Map<String, Value>) {
    for (key, value) in map {
        if value.is_array() || value.is_object() || value.is_null() || key == "name" {
            continue;
        }
        let _ = writeln!(out, "- **{key}**: {}", scalar_text(value));
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.replace('\n', " "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time() -> DateTime<Local> {
        DateTime::parse_from_rfc3339("2025-03-01T08:30:00+08:00").unwrap().with_timezone(&Local)
    }

    #[test]
    fn renders_group_fields_and_members() {
        let body = json!({"data": {
            "title": "杭州创业者群",
            "city": "杭州",
            "users": [
                {"name": "张三", "industry": "医疗", "bio": "十年经验\n连续创业"},
                {"name": "李四", "industry": "教育"}
            ]
        }});
        let (md, count) = render("42", &body, fixed_time());
        assert_eq!(count, 2);
        assert!(md.starts_with("# 群组 42"));
        assert!(md.contains("- **title**: 杭州创业者群"));
        assert!(md.contains("## 成员 (2)"));
        assert!(md.contains("### 1. 张三"));
        assert!(md.contains("- **bio**: 十年经验 连续创业"));
        assert!(!md.contains("- **users**"));
    }

    #[test]
    fn plain_text_listing_is_kept_as_is() {
        let body = json!({"data": "群成员: 张三, 李四"});
        let (md, count) = render("7", &body, fixed_time());
        assert_eq!(count, 0);
        assert!(md.contains("群成员: 张三, 李四"));
    }

    #[test]
    fn file_name_is_sanitized() {
        let p = transcript_path(Path::new("/tmp"), "../evil id", fixed_time(), 0);
        let name = p.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("group____evil_id_"));
        assert_eq!(p.parent().unwrap(), Path::new("/tmp"));
    }

    #[tokio::test]
    async fn export_writes_the_file_and_returns_its_path() {
        let dir = std::env::temp_dir().join(format!("ahh-transcript-{}", std::process::id()));
        let body = json!({"data": {"users": [{"name": "王五"}]}});
        let out = export("9", &body, &dir).await.unwrap();
        let path = PathBuf::from(out["file_path"].as_str().unwrap());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("王五"));
        assert_eq!(out["member_count"], 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn exports_in_the_same_instant_get_distinct_files() {
        let dir = std::env::temp_dir().join(format!("ahh-transcript-dup-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = write_fresh(&dir, "5", fixed_time(), b"first").await.unwrap();
        let second = write_fresh(&dir, "5", fixed_time(), b"second").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "second");
        assert!(second.to_string_lossy().ends_with("_1.md"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
