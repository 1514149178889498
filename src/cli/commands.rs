use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use chrono::Local;

use crate::app::{AppContext, FreshetError, Result};
use crate::domain::{content_digest, FetchOutcome, InputRef, RawData};
use crate::store::{JsonStateStore, StateStore};
use crate::watch::{Source, WatchOptions, Watcher};

const STDIN_INPUT: &str = "-";

pub async fn check(ctx: &AppContext, inputs: &[String], state_path: Option<&Path>) -> Result<()> {
    let store = state_path.map(JsonStateStore::new);
    let sources = parse_inputs(inputs)?;

    for (key, input) in inputs.iter().zip(sources) {
        let mut state = match &store {
            Some(store) => store.load(key)?.unwrap_or_else(|| ctx.new_state()),
            None => ctx.new_state(),
        };

        let outcome = ctx
            .fetcher
            .fetch(&input, &ctx.request, ctx.timeout, &mut state)
            .await?;
        println!("{}", describe(&input.to_string(), &outcome));

        if let Some(store) = &store {
            store.save(key, &state)?;
        }
    }

    Ok(())
}

pub async fn watch(
    ctx: &AppContext,
    inputs: &[String],
    interval: Duration,
    workers: usize,
    output: Option<&Path>,
) -> Result<()> {
    let sources = parse_inputs(inputs)?
        .into_iter()
        .map(|input| Source::with_state(input, ctx.new_state()))
        .collect();

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let options = WatchOptions {
        interval,
        timeout: ctx.timeout,
        request: ctx.request.clone(),
        workers,
    };
    let mut watcher = Watcher::new(ctx.fetcher.clone(), sources, options);

    watcher
        .run(|report| {
            let timestamp = report
                .polled_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S");

            let outcome = match &report.result {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("[{}] error        {}: {}", timestamp, report.label, e);
                    return;
                }
            };

            if outcome.is_not_modified() {
                return;
            }
            println!("[{}] {}", timestamp, describe(&report.label, outcome));

            if let (Some(dir), Some(bytes)) = (output, outcome.bytes()) {
                let path = dir.join(output_file_name(report.index, &report.label));
                if let Err(e) = fs::write(&path, bytes) {
                    tracing::error!("Failed to write {}: {}", path.display(), e);
                }
            }
        })
        .await
}

/// Turn command-line arguments into input references. `-` reads stdin once.
pub fn parse_inputs(inputs: &[String]) -> Result<Vec<InputRef>> {
    if inputs.iter().filter(|i| *i == STDIN_INPUT).count() > 1 {
        return Err(FreshetError::Other(
            "stdin can only be used as one input".to_string(),
        ));
    }

    inputs
        .iter()
        .map(|input| {
            if input == STDIN_INPUT {
                let mut buf = Vec::new();
                std::io::stdin().read_to_end(&mut buf)?;
                Ok(InputRef::Inline(inline_data(buf)))
            } else {
                Ok(InputRef::location(input.as_str()))
            }
        })
        .collect()
}

fn inline_data(buf: Vec<u8>) -> RawData {
    match String::from_utf8(buf) {
        Ok(text) => RawData::Text(text),
        Err(e) => RawData::Bytes(e.into_bytes()),
    }
}

/// One-line summary of a poll.
pub fn describe(label: &str, outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Content {
            bytes: Some(bytes), ..
        } => format!(
            "changed      {} ({} bytes, sha256 {})",
            label,
            bytes.len(),
            &content_digest(bytes)[..12]
        ),
        FetchOutcome::Content { bytes: None, input } => {
            format!("changed      {} ({})", label, input.kind())
        }
        FetchOutcome::NotModified { .. } => format!("unchanged    {}", label),
        FetchOutcome::NotOk { response } if response.is_synthesized() => {
            format!("unavailable  {}: {}", label, response.text())
        }
        FetchOutcome::NotOk { response } => {
            format!("unavailable  {}: HTTP {}", label, response.status)
        }
    }
}

/// File name for a saved body: source position plus the last URL path segment.
fn output_file_name(index: usize, label: &str) -> String {
    let segment = url::Url::parse(label)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.last().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| "index".to_string());

    let sanitized: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{:02}-{}", index, sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::{ResolvedInput, Response};
    use crate::transport::mock::{ok, MockTransport};
    use crate::transport::TransportError;
    use std::sync::Arc;

    #[test]
    fn test_describe_content() {
        let outcome = FetchOutcome::Content {
            bytes: Some(b"hello".to_vec()),
            input: ResolvedInput::Url {
                path: "https://example.com/a".into(),
            },
        };
        assert_eq!(
            describe("https://example.com/a", &outcome),
            "changed      https://example.com/a (5 bytes, sha256 2cf24dba5fb0)"
        );
    }

    #[test]
    fn test_describe_local_content() {
        let outcome = FetchOutcome::Content {
            bytes: None,
            input: ResolvedInput::File {
                path: "spec.yaml".into(),
            },
        };
        assert_eq!(describe("spec.yaml", &outcome), "changed      spec.yaml (file)");
    }

    #[test]
    fn test_describe_not_ok() {
        let status = FetchOutcome::NotOk {
            response: Response::new(503),
        };
        assert_eq!(describe("u", &status), "unavailable  u: HTTP 503");

        let error = TransportError::Connect {
            url: "u".into(),
            message: "refused".into(),
        };
        let failed = FetchOutcome::NotOk {
            response: Response::from_transport_error(&error),
        };
        assert_eq!(
            describe("u", &failed),
            "unavailable  u: could not connect to u: refused"
        );
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(0, "https://example.com/api/openapi.json"),
            "00-openapi.json"
        );
        assert_eq!(output_file_name(3, "https://example.com/"), "03-index");
        assert_eq!(
            output_file_name(12, "https://example.com/spec%20v2.yaml"),
            "12-spec_20v2.yaml"
        );
        assert_eq!(output_file_name(1, "<inline, 3 bytes>"), "01-index");
    }

    #[test]
    fn test_parse_inputs_without_stdin() {
        let inputs = vec![
            "https://example.com/openapi.json".to_string(),
            "./local.yaml".to_string(),
        ];
        let parsed = parse_inputs(&inputs).unwrap();
        assert_eq!(parsed[0].resolve().kind(), "url");
        assert_eq!(parsed[1].resolve().kind(), "file");
    }

    #[test]
    fn test_parse_inputs_rejects_double_stdin() {
        let inputs = vec!["-".to_string(), "-".to_string()];
        assert!(parse_inputs(&inputs).is_err());
    }

    #[test]
    fn test_inline_data_prefers_text() {
        assert_eq!(inline_data(b"abc".to_vec()), RawData::Text("abc".into()));
        assert_eq!(inline_data(vec![0xff]), RawData::Bytes(vec![0xff]));
    }

    #[tokio::test]
    async fn test_check_persists_state_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let url = "https://example.com/openapi.json".to_string();

        let transport = Arc::new(MockTransport::new());
        transport.reply(ok("body")).reply(Response::new(200)).reply(ok("body"));
        let ctx = AppContext::with_transport(Config::default(), transport.clone()).unwrap();

        check(&ctx, &[url.clone()], Some(state_path.as_path())).await.unwrap();
        check(&ctx, &[url.clone()], Some(state_path.as_path())).await.unwrap();

        // The second run had a baseline, so it probed first
        let methods: Vec<String> = transport
            .methods()
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(methods, vec!["GET", "HEAD", "GET"]);

        let saved = JsonStateStore::new(&state_path).load(&url).unwrap().unwrap();
        assert_eq!(saved.last_value.as_deref(), Some("body"));
        assert_eq!(saved.head_supported, Some(true));
    }

    #[tokio::test]
    async fn test_check_without_state_always_starts_fresh() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(ok("body")).reply(ok("body"));
        let ctx = AppContext::with_transport(Config::default(), transport.clone()).unwrap();
        let inputs = vec!["https://example.com/openapi.json".to_string()];

        check(&ctx, &inputs, None).await.unwrap();
        check(&ctx, &inputs, None).await.unwrap();

        assert_eq!(transport.call_count(), 2);
    }
}
