// sitesync/src/sync/confirm.rs
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Delete,
    DeleteAll,
    Keep,
    KeepAll,
}

impl DeleteChoice {
    fn parse(answer: &str) -> Option<Self> {
        match answer {
            "d" => Some(DeleteChoice::Delete),
            "D" => Some(DeleteChoice::DeleteAll),
            "k" => Some(DeleteChoice::Keep),
            "K" => Some(DeleteChoice::KeepAll),
            _ => None,
        }
    }
}

/// Asks the operator, key by key, whether stale remote files should go.
///
/// Once `D` or `K` is answered every later key follows it without a prompt.
pub struct DeletionConfirmer<R, W> {
    input: R,
    output: W,
    standing: Option<DeleteChoice>,
}

impl<R: BufRead, W: Write> DeletionConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        DeletionConfirmer { input, output, standing: None }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Returns `true` when `key` should be deleted.
    pub fn confirm(&mut self, key: &str, site_dir: &str) -> Result<bool> {
        let choice = match self.standing {
            Some(choice) => choice,
            None => self.prompt(key, site_dir)?,
        };
        if matches!(choice, DeleteChoice::DeleteAll | DeleteChoice::KeepAll) {
            self.standing = Some(choice);
        }
        Ok(matches!(choice, DeleteChoice::Delete | DeleteChoice::DeleteAll))
    }

    fn prompt(&mut self, key: &str, site_dir: &str) -> Result<DeleteChoice> {
        loop {
            writeln!(
                self.output,
                "{} is on S3 but not in your {} directory anymore. Do you want to [d]elete, [D]elete all, [k]eep, [K]eep all?",
                key, site_dir
            )
            .context("Failed to write deletion prompt")?;
            self.output.flush().context("Failed to flush stdout")?;

            let mut answer = String::new();
            let read = self
                .input
                .read_line(&mut answer)
                .context("Failed to read user input")?;
            if read == 0 {
                // Closed input can never answer, keep what is left.
                tracing::warn!("stdin closed during deletion confirmation, keeping remaining files");
                return Ok(DeleteChoice::KeepAll);
            }
            if let Some(choice) = DeleteChoice::parse(answer.trim_end_matches(['\r', '\n'])) {
                return Ok(choice);
            }
        }
    }
}
