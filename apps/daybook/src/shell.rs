//! # Operator Shell
//!
//! Reads one command per line, runs it to completion, prints the outcome,
//! then reads the next. Nothing runs concurrently with a command.
//!
//! Input and output are generic so scripted sessions can drive the shell in
//! tests exactly as an operator would at the terminal.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{info, warn};

use daybook_db::PersistenceGateway;

use crate::commands::{self, day, debt, is_yes, Command};
use crate::error::{AppError, AppResult};
use crate::service::DayBookService;

const PROMPT: &str = "> ";

/// What the loop does after a command.
enum Flow {
    Continue,
    Quit,
}

pub struct Shell<G: PersistenceGateway> {
    service: DayBookService<G>,
    store_name: String,
}

impl<G: PersistenceGateway> Shell<G> {
    pub fn new(service: DayBookService<G>, store_name: impl Into<String>) -> Self {
        Shell {
            service,
            store_name: store_name.into(),
        }
    }

    pub fn service(&self) -> &DayBookService<G> {
        &self.service
    }

    /// Runs until `quit` or end of input.
    ///
    /// Only I/O errors on `input`/`out` end the loop early; command errors
    /// are printed and the loop carries on.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        writeln!(out, "{}", day::status(&self.service, &self.store_name))?;
        writeln!(out, "Type `help` for commands.")?;

        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    print_error(out, &err)?;
                    continue;
                }
            };

            match self.dispatch(command, &mut lines, out).await? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }

        self.shutdown(out).await
    }

    async fn dispatch<R, W>(
        &mut self,
        command: Command,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> io::Result<Flow>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let result = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => Ok(commands::HELP.to_string()),
            Command::Status => Ok(day::status(&self.service, &self.store_name)),
            Command::Debtors => Ok(debt::debtors(&self.service)),
            Command::Sales { field, raw } => {
                day::set_sales_field(&mut self.service, field, &raw).await
            }
            Command::Add { amount, name } => debt::add_debt(&mut self.service, &name, amount).await,
            Command::Remove { name } => {
                let confirmed = self.confirm_removal(&name, lines, out).await?;
                debt::remove_debt(&mut self.service, &name, confirmed).await
            }
            Command::Repay { amount, name } => debt::repay(&mut self.service, &name, amount).await,
            Command::Close => day::close_day(&mut self.service).await,
            Command::NewDay => day::start_new_day(&mut self.service).await,
            Command::History { limit } => day::history(&self.service, limit).await,
            Command::Save => day::save(&mut self.service).await,
        };

        print_result(out, result)?;
        Ok(Flow::Continue)
    }

    /// Asks `y/N` when there is something to remove.
    ///
    /// When there is nothing, no question is asked and the ledger reports
    /// why the removal cannot happen.
    async fn confirm_removal<R, W>(
        &self,
        name: &str,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> io::Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let debt = self.service.customer_debt(name);
        if !self.service.book().session().is_open() || debt.new_debt.is_zero() {
            return Ok(false);
        }

        write!(out, "Remove {} owed by {} today? [y/N] ", debt.new_debt, debt.name)?;
        out.flush()?;
        let answer = lines.next_line().await?.unwrap_or_default();
        Ok(is_yes(&answer))
    }

    /// Last attempt to store anything unsaved before leaving.
    async fn shutdown<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.service.has_unsaved_changes() {
            match self.service.flush().await {
                Ok(()) => info!("Unsaved changes stored on exit"),
                Err(err) => {
                    warn!(error = %err, "Exiting with unsaved changes");
                    print_error(out, &err)?;
                }
            }
        }
        writeln!(out, "Bye.")
    }
}

fn print_result<W: Write>(out: &mut W, result: AppResult<String>) -> io::Result<()> {
    match result {
        Ok(text) => writeln!(out, "{text}"),
        Err(err) => print_error(out, &err),
    }
}

fn print_error<W: Write>(out: &mut W, err: &AppError) -> io::Result<()> {
    writeln!(out, "error [{}]: {}", err.code, err.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::{CommissionPolicy, Money, NameRule};
    use daybook_db::MemoryGateway;

    async fn run_script(script: &str) -> (Shell<MemoryGateway>, String) {
        let service = DayBookService::start(
            MemoryGateway::new(),
            CommissionPolicy::default(),
            NameRule::FullName,
        )
        .await
        .unwrap();
        let mut shell = Shell::new(service, "Test Shop");
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).await.unwrap();
        (shell, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_full_day_script() {
        let script = "\
cash 5000
bank 3000
declared 8000
add 8000 Ali Hassan
close
new-day
quit
";
        let (shell, out) = run_script(script).await;

        assert!(out.contains("Day closed."), "{out}");
        assert!(out.contains("New day started. 1 debtor(s) carried over, 8,000 outstanding."));
        assert!(out.ends_with("Bye.\n"));
        assert_eq!(
            shell.service().customer_debt("Ali Hassan").carried_debt,
            Money::from_units(8000)
        );
    }

    #[tokio::test]
    async fn test_remove_asks_for_confirmation() {
        let script = "\
add 700 Ali Hassan
remove Ali Hassan
n
remove Ali Hassan
y
";
        let (shell, out) = run_script(script).await;

        assert_eq!(out.matches("[y/N]").count(), 2);
        assert!(out.contains("Kept."));
        assert!(out.contains("Removed 700 owed by Ali Hassan."));
        assert!(shell.service().book().session().new_debts.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_skips_prompt() {
        let (_, out) = run_script("remove Nobody Here\n").await;
        assert!(!out.contains("[y/N]"));
        assert!(out.contains("error [NOT_FOUND]"));
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_the_loop() {
        let script = "\
frobnicate
declared 500
close
status
";
        let (_, out) = run_script(script).await;

        assert!(out.contains("error [INVALID_INPUT]: unknown command 'frobnicate'"));
        assert!(out.contains("error [NOT_RECONCILED]"));
        assert!(out.contains("Ready to close: no"));
        assert!(out.ends_with("Bye.\n"));
    }
}
