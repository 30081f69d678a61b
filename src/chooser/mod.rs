//! Bridge to the external interactive chooser (fzf by default).
//!
//! The chooser reads tab-separated protocol lines on stdin, hides the first
//! field, shows the rest, runs the previewer on the first field and prints
//! the picked line on stdout.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::PipelineError;
use crate::output::{ProtocolLine, FIELD_DELIMITER};

// fzf exit codes that mean "nothing picked" rather than failure
const EXIT_NO_MATCH: i32 = 1;
const EXIT_INTERRUPTED: i32 = 130;

/// What the chooser is asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserRequest {
    /// Newline-joined protocol lines
    pub input: String,
}

impl ChooserRequest {
    pub fn from_lines(lines: &[ProtocolLine]) -> Self {
        let input = lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Self { input }
    }
}

/// What came back from the chooser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChooserResponse {
    /// The selected input line, verbatim
    Selected(String),
    /// The user quit without choosing
    Aborted,
}

/// Interactive selection over protocol lines
pub trait Chooser {
    fn choose(&self, request: &ChooserRequest) -> Result<ChooserResponse, PipelineError>;
}

/// Runs a chooser program, feeding the request on stdin and reading the
/// selection from stdout. The terminal UI goes to the inherited stderr/tty.
#[derive(Debug, Clone)]
pub struct ProcessChooser {
    program: String,
    args: Vec<OsString>,
}

impl ProcessChooser {
    pub fn new(program: impl Into<String>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// fzf wired to show fields 2-5, keep ANSI colors and preview field 1
    /// with `previewer`.
    pub fn fzf(program: impl Into<String>, previewer: &str) -> Self {
        Self::new(program, Self::fzf_args(previewer))
    }

    pub fn fzf_args(previewer: &str) -> Vec<OsString> {
        vec![
            OsString::from("--ansi"),
            OsString::from(format!("--delimiter={}", FIELD_DELIMITER)),
            OsString::from("--with-nth=2,3,4,5"),
            OsString::from("--preview"),
            OsString::from(format!("{} {{1}}", previewer)),
        ]
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn unavailable(&self, source: io::Error) -> PipelineError {
        PipelineError::ChooserUnavailable {
            program: self.program.clone(),
            source,
        }
    }
}

impl Chooser for ProcessChooser {
    fn choose(&self, request: &ChooserRequest) -> Result<ChooserResponse, PipelineError> {
        log::debug!("Running chooser `{}` with {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            let written = stdin
                .write_all(request.input.as_bytes())
                .and_then(|_| stdin.write_all(b"\n"));
            match written {
                // The chooser may exit before reading everything
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(PipelineError::ChooserFailed {
                        program: self.program.clone(),
                        detail: format!("could not write input: {}", e),
                    });
                }
                Ok(()) => {}
            }
            // stdin dropped here so the chooser sees EOF
        }

        let output = child
            .wait_with_output()
            .map_err(|e| PipelineError::ChooserFailed {
                program: self.program.clone(),
                detail: format!("could not wait for process: {}", e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let selected = stdout.lines().next().unwrap_or_default();

        match output.status.code() {
            Some(0) if selected.trim().is_empty() => Ok(ChooserResponse::Aborted),
            Some(0) => Ok(ChooserResponse::Selected(selected.to_string())),
            Some(EXIT_NO_MATCH) | Some(EXIT_INTERRUPTED) => Ok(ChooserResponse::Aborted),
            _ => Err(PipelineError::ChooserFailed {
                program: self.program.clone(),
                detail: format!("exited with {}", output.status),
            }),
        }
    }
}

/// Show `lines` in the chooser and return the artifact path of the pick.
///
/// Only the hidden first field is trusted; the rest are display copies.
pub fn select<C: Chooser + ?Sized>(
    chooser: &C,
    lines: &[ProtocolLine],
) -> Result<Option<PathBuf>, PipelineError> {
    let request = ChooserRequest::from_lines(lines);
    match chooser.choose(&request)? {
        ChooserResponse::Aborted => Ok(None),
        ChooserResponse::Selected(line) => Ok(ProtocolLine::key_of(&line).map(PathBuf::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn line(path: &str, title: &str) -> ProtocolLine {
        ProtocolLine {
            artifact_path: PathBuf::from(path),
            age: "1 hour ago".to_string(),
            status: "OPEN".to_string(),
            title: title.to_string(),
            repo: "octo/widgets".to_string(),
        }
    }

    /// Records the request and answers with a fixed response
    struct ScriptedChooser {
        response: ChooserResponse,
        seen: RefCell<Option<ChooserRequest>>,
    }

    impl Chooser for ScriptedChooser {
        fn choose(&self, request: &ChooserRequest) -> Result<ChooserResponse, PipelineError> {
            *self.seen.borrow_mut() = Some(request.clone());
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_request_joins_lines_with_newlines() {
        let request = ChooserRequest::from_lines(&[line("/tmp/a.md", "A"), line("/tmp/b.md", "B")]);
        assert_eq!(
            request.input,
            "/tmp/a.md\t1 hour ago\tOPEN\tA\tocto/widgets\n/tmp/b.md\t1 hour ago\tOPEN\tB\tocto/widgets"
        );
    }

    #[test]
    fn test_select_returns_first_field_only() {
        let chooser = ScriptedChooser {
            response: ChooserResponse::Selected(
                "/tmp/b.md\t1 hour ago\t\x1b[32mOPEN\x1b[39m\tB\tocto/widgets".to_string(),
            ),
            seen: RefCell::new(None),
        };
        let lines = vec![line("/tmp/a.md", "A"), line("/tmp/b.md", "B")];

        let picked = select(&chooser, &lines).unwrap();
        assert_eq!(picked, Some(PathBuf::from("/tmp/b.md")));
        assert!(chooser.seen.borrow().as_ref().unwrap().input.contains("/tmp/a.md"));
    }

    #[test]
    fn test_select_aborted_is_none() {
        let chooser = ScriptedChooser {
            response: ChooserResponse::Aborted,
            seen: RefCell::new(None),
        };
        assert_eq!(select(&chooser, &[line("/tmp/a.md", "A")]).unwrap(), None);
    }

    #[test]
    fn test_fzf_args() {
        let args = ProcessChooser::fzf_args("bat --color=always");
        assert_eq!(
            args,
            vec![
                OsString::from("--ansi"),
                OsString::from("--delimiter=\t"),
                OsString::from("--with-nth=2,3,4,5"),
                OsString::from("--preview"),
                OsString::from("bat --color=always {1}"),
            ]
        );
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let chooser = ProcessChooser::new("pr-pick-no-such-chooser-binary", vec![]);
        let err = chooser
            .choose(&ChooserRequest::from_lines(&[line("/tmp/a.md", "A")]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::ChooserUnavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_echoing_first_line() {
        let chooser = ProcessChooser::new("head", vec![OsString::from("-n1")]);
        let lines = vec![line("/tmp/a.md", "A"), line("/tmp/b.md", "B")];
        assert_eq!(
            select(&chooser, &lines).unwrap(),
            Some(PathBuf::from("/tmp/a.md"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_process_empty_output_is_aborted() {
        let chooser = ProcessChooser::new("sh", vec![OsString::from("-c"), OsString::from("cat > /dev/null")]);
        let response = chooser
            .choose(&ChooserRequest::from_lines(&[line("/tmp/a.md", "A")]))
            .unwrap();
        assert_eq!(response, ChooserResponse::Aborted);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_interrupted_is_aborted() {
        let chooser = ProcessChooser::new("sh", vec![OsString::from("-c"), OsString::from("exit 130")]);
        let response = chooser
            .choose(&ChooserRequest::from_lines(&[line("/tmp/a.md", "A")]))
            .unwrap();
        assert_eq!(response, ChooserResponse::Aborted);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_error_exit_is_failure() {
        let chooser = ProcessChooser::new("sh", vec![OsString::from("-c"), OsString::from("exit 2")]);
        let err = chooser
            .choose(&ChooserRequest::from_lines(&[line("/tmp/a.md", "A")]))
            .unwrap_err();
        match err {
            PipelineError::ChooserFailed { program, detail } => {
                assert_eq!(program, "sh");
                assert!(detail.contains('2'), "{}", detail);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
