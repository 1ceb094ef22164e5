use super::{Command, HELP};
use crate::gateway::Gateway;
use crate::notify::Notifier;
use crate::session::models::{DocumentRef, FileHandle, Message};
use crate::session::{FileCenter, SessionError};
use std::path::Path;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum UploadPathError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("unsupported file type (accepted: pdf, docx, txt, md): {0}")]
    Unsupported(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub fn render(message: &Message) -> String {
    format!("[{}] {}", message.role.label(), message.content)
}

/// Read a local file, select it and upload it.
pub async fn upload_path<G: Gateway, N: Notifier>(
    center: &FileCenter<G, N>,
    path: &Path,
) -> Result<DocumentRef, UploadPathError> {
    let file = FileHandle::from_path(path)
        .await
        .map_err(|source| UploadPathError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let name = file.name.clone();
    if !center.select(Some(file)) {
        return Err(UploadPathError::Unsupported(name));
    }
    Ok(center.submit().await?)
}

/// Print the newest transcript entry, i.e. what the last operation produced.
async fn print_last<G: Gateway, N: Notifier, W: AsyncWrite + Unpin>(
    center: &FileCenter<G, N>,
    output: &mut W,
) -> io::Result<()> {
    if let Some(message) = center.transcript().last() {
        output
            .write_all(format!("{}\n", render(message)).as_bytes())
            .await?;
    }
    Ok(())
}

async fn print_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await
}

/// Returns `false` once the user asked to leave.
pub async fn execute<G: Gateway, N: Notifier, W: AsyncWrite + Unpin>(
    center: &FileCenter<G, N>,
    command: Command,
    export_dir: &Path,
    output: &mut W,
) -> io::Result<bool> {
    match command {
        Command::Ask(question) => {
            if !center.can_send() {
                // the session raises the warning itself when no document is set
                if let Err(err) = center.send(&question).await {
                    tracing::debug!(error = %err, "question not sent");
                }
                return Ok(true);
            }
            print_line(output, "Thinking...").await?;
            match center.send(&question).await {
                Ok(answer) => print_line(output, &render(&answer)).await?,
                Err(SessionError::Transport(_)) => print_last(center, output).await?,
                Err(err) => print_line(output, &err.to_string()).await?,
            }
        }
        Command::Upload(path) => {
            print_line(output, "Uploading...").await?;
            match upload_path(center, &path).await {
                Ok(_) | Err(UploadPathError::Session(SessionError::Transport(_))) => {
                    print_last(center, output).await?
                }
                Err(err) => print_line(output, &err.to_string()).await?,
            }
        }
        Command::Export => match center.save_export(export_dir).await {
            Ok(path) => print_line(output, &format!("Saved {}", path.display())).await?,
            Err(SessionError::NothingToExport) => {}
            Err(err) => print_line(output, &err.to_string()).await?,
        },
        Command::Reset => {
            center.reset();
            print_last(center, output).await?;
        }
        Command::State => {
            let state = center.state();
            let mut line = format!("state: {}", state.name());
            if let Some(document) = state.document() {
                line.push_str(&format!(
                    ", document: {} ({}, {} chunks)",
                    document.id, document.kind, document.chunk_count
                ));
            }
            if let Some(selected) = center.selected_file() {
                line.push_str(&format!(", selected: {}", selected));
            }
            line.push_str(&format!(", session: {}", center.session_id()));
            print_line(output, &line).await?;
        }
        Command::Help => print_line(output, HELP).await?,
        Command::Quit => return Ok(false),
        Command::Unknown(line) => {
            print_line(output, &format!("Unknown command: {} (try /help)", line)).await?
        }
    }
    Ok(true)
}

/// Interactive loop: one command per line until `/quit` or end of input.
pub async fn run_chat<G, N, R, W>(
    center: &FileCenter<G, N>,
    export_dir: &Path,
    input: R,
    output: &mut W,
) -> io::Result<()>
where
    G: Gateway,
    N: Notifier,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    print_last(center, output).await?;
    let mut lines = input.lines();
    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        if !execute(center, command, export_dir, output).await? {
            break;
        }
    }
    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use crate::session::testing::center;
    use crate::session::transcript::GREETING;

    async fn run(center: &crate::session::testing::Center, dir: &Path, script: &str) -> String {
        let mut out = Vec::new();
        run_chat(center, dir, script.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_chat_loop_uploads_asks_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("report.pdf");
        std::fs::write(&doc, b"%PDF").unwrap();

        let center = center();
        center.gateway().upload_ok("report.pdf", "pdf", 12);
        center.gateway().ask_ok("It covers Q3.");

        let script = format!(
            "/upload {}\nWhat is the summary?\n\n/export\n/quit\nignored\n",
            doc.display()
        );
        let out = run(&center, dir.path(), &script).await;

        assert!(out.starts_with(&format!("[Assistant] {GREETING}")));
        assert!(out.contains("\"report.pdf\" was analyzed successfully (12 chunks)"));
        assert!(out.contains("[Assistant] It covers Q3."));
        assert!(out.contains("Saved "));
        assert_eq!(center.gateway().ask_calls().len(), 1);

        let exported: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("chat-history-"))
            .collect();
        assert_eq!(exported.len(), 1);
    }

    #[tokio::test]
    async fn test_chat_loop_question_without_document() {
        let dir = tempfile::tempdir().unwrap();
        let center = center();
        let out = run(&center, dir.path(), "hello?\n/state\n").await;

        assert!(!out.contains("Thinking"));
        assert!(out.contains("state: no-document"));
        assert_eq!(center.notifier().count(Severity::Warning), 1);
        assert_eq!(center.gateway().call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_loop_reports_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo.png");
        std::fs::write(&image, b"png").unwrap();

        let center = center();
        let script = format!(
            "/upload {}\n/upload {}\n/bogus\n",
            image.display(),
            dir.path().join("absent.pdf").display()
        );
        let out = run(&center, dir.path(), &script).await;

        assert!(out.contains("unsupported file type"));
        assert!(out.contains("cannot read"));
        assert!(out.contains("Unknown command: /bogus"));
        assert_eq!(center.gateway().call_count(), 0);
        assert_eq!(center.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_loop_prints_failed_answer() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("report.pdf");
        std::fs::write(&doc, b"%PDF").unwrap();

        let center = center();
        center.gateway().upload_ok("report.pdf", "pdf", 2);
        center.gateway().ask_err("model unavailable");
        let script = format!("/upload {}\nsummary?\n/reset\n", doc.display());
        let out = run(&center, dir.path(), &script).await;

        assert!(out.contains("[Assistant] ❌ Sorry, I can't answer right now: model unavailable"));
        assert_eq!(center.document(), None);
        assert!(out.trim_end().ends_with(&format!("[Assistant] {GREETING}\n>")));
    }
}
