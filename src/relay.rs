use std::io::Write;

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::models::Permission;

/// Body of a pushed message.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PushPayload {
    pub title: String,
    pub message: String,
}

pub trait Notifier {
    fn show(&mut self, title: &str, body: &str) -> std::io::Result<()>;
}

/// Rings the terminal bell and prints a banner.
pub struct TerminalNotifier<W> {
    out: W,
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn show(&mut self, title: &str, body: &str) -> std::io::Result<()> {
        writeln!(self.out, "\x07🌱 {title}\n   {body}")?;
        self.out.flush()
    }
}

/// Reads one JSON payload per line and surfaces each as a notification.
/// Nothing is shown unless permission was granted; undecodable lines are
/// logged and skipped. Returns how many notifications were shown.
pub async fn relay<R, N>(
    reader: R,
    permission: Permission,
    notifier: &mut N,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    N: Notifier,
{
    if permission != Permission::Granted {
        warn!(
            permission = permission.as_str(),
            "notification permission not granted; pushes will be dropped"
        );
    }

    let mut lines = reader.lines();
    let mut shown = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let payload: PushPayload = match serde_json::from_str(line) {
            Ok(p) => p,
            Err(e) => {
                warn!("dropping undecodable push payload: {e}");
                continue;
            }
        };
        if permission != Permission::Granted {
            continue;
        }
        if let Err(e) = notifier.show(&payload.title, &payload.message) {
            warn!("showing notification failed: {e}");
            continue;
        }
        shown += 1;
    }
    info!(shown, "push channel closed");
    Ok(shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(String, String)>);

    impl Notifier for Recorder {
        fn show(&mut self, title: &str, body: &str) -> std::io::Result<()> {
            self.0.push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    const INPUT: &[u8] = br#"{"title":"Siram","message":"Tomat haus"}
not json

{"title":"Pupuk","message":"NPK 16","icon":"x"}
{"title":"tanpa pesan"}
"#;

    #[tokio::test]
    async fn granted_payloads_are_shown_in_order() {
        let mut rec = Recorder::default();
        let shown = relay(INPUT, Permission::Granted, &mut rec).await.unwrap();
        assert_eq!(shown, 2);
        assert_eq!(
            rec.0,
            vec![
                ("Siram".to_string(), "Tomat haus".to_string()),
                ("Pupuk".to_string(), "NPK 16".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn nothing_is_shown_without_permission() {
        for permission in [Permission::Default, Permission::Denied] {
            let mut rec = Recorder::default();
            assert_eq!(relay(INPUT, permission, &mut rec).await.unwrap(), 0);
            assert!(rec.0.is_empty());
        }
    }

    #[test]
    fn terminal_banner_has_title_and_body() {
        let mut buf = Vec::new();
        TerminalNotifier::new(&mut buf).show("Siram", "Tomat haus").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("🌱 Siram"));
        assert!(text.ends_with("   Tomat haus\n"));
    }
}
