//! # Shell Commands
//!
//! One operator line becomes one [`Command`], and each command has a handler
//! that drives the [`DayBookService`](crate::service::DayBookService) and
//! returns the text to print.
//!
//! ## Command Categories
//! - `day` - Sales fields, status, close, new day, history, save
//! - `debt` - Itemized debts, repayments, debtor list
//!
//! ## Command Pattern
//! ```rust,ignore
//! pub async fn command_name<G: PersistenceGateway>(
//!     service: &mut DayBookService<G>,
//!     args...,
//! ) -> AppResult<String> {
//!     // 1. Run the event through the service (mutate, then persist)
//!     // 2. Render the outcome for the operator
//! }
//! ```

pub mod day;
pub mod debt;

use std::str::FromStr;

use daybook_core::{parse_amount, Money, SalesField, ValidationError};

use crate::error::AppError;

/// Reports shown by `history` when no count is given.
pub const DEFAULT_HISTORY_LIMIT: u32 = 7;

/// Printed by `help`.
pub const HELP: &str = "\
Commands:
  cash <amount>              set today's cash sales
  bank <amount>              set today's bank transfers
  declared|credit <amount>   set today's declared credit sales
  add <amount> <name>        record a credit sale for a customer
  remove <name>              drop a customer's credit sale (asks to confirm)
  repay <amount> <name>      book a repayment
  status                     show today's totals
  debtors                    list everyone who owes money
  close                      close the day and store its report
  new-day                    start the next day after a close
  history [n]                show the last n closed-day reports
  save                       retry saving anything not yet stored
  help                       show this list
  quit                       leave the shell";

/// A parsed operator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `cash`, `bank` and `declared`. The raw text is parsed by the ledger.
    Sales { field: SalesField, raw: String },
    Add { amount: Money, name: String },
    Remove { name: String },
    Repay { amount: Money, name: String },
    Status,
    Debtors,
    Close,
    NewDay,
    History { limit: u32 },
    Save,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let verb = verb.to_lowercase();
        let command = match verb.as_str() {
            "cash" | "bank" | "declared" | "credit" => Command::Sales {
                field: verb
                    .parse()
                    .map_err(|e: ValidationError| AppError::invalid_input(e.to_string()))?,
                raw: required(&verb, "amount", rest)?.to_string(),
            },
            "add" => {
                let (amount, name) = amount_and_name(&verb, rest)?;
                Command::Add { amount, name }
            }
            "repay" => {
                let (amount, name) = amount_and_name(&verb, rest)?;
                Command::Repay { amount, name }
            }
            "remove" | "rm" => Command::Remove {
                name: required(&verb, "customer name", rest)?.to_string(),
            },
            "status" | "summary" => Command::Status,
            "debtors" => Command::Debtors,
            "close" => Command::Close,
            "new-day" | "newday" => Command::NewDay,
            "history" => Command::History {
                limit: parse_limit(rest)?,
            },
            "save" => Command::Save,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(AppError::invalid_input(format!(
                    "unknown command '{other}', type `help` for the list"
                )))
            }
        };

        Ok(command)
    }
}

fn required<'a>(verb: &str, what: &str, rest: &'a str) -> Result<&'a str, AppError> {
    if rest.is_empty() {
        return Err(AppError::invalid_input(format!("`{verb}` needs {what}")));
    }
    Ok(rest)
}

/// `<amount> <name...>`; the name keeps its inner spacing for the ledger to
/// normalize.
fn amount_and_name(verb: &str, rest: &str) -> Result<(Money, String), AppError> {
    let usage = || AppError::invalid_input(format!("usage: {verb} <amount> <customer name>"));
    let (amount, name) = rest.split_once(char::is_whitespace).ok_or_else(usage)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(usage());
    }
    Ok((parse_amount(amount), name.to_string()))
}

fn parse_limit(rest: &str) -> Result<u32, AppError> {
    if rest.is_empty() {
        return Ok(DEFAULT_HISTORY_LIMIT);
    }
    match rest.parse::<u32>() {
        Ok(0) | Err(_) => Err(AppError::invalid_input(format!(
            "history count must be a positive whole number, got '{rest}'"
        ))),
        Ok(n) => Ok(n),
    }
}

/// `y` or `yes`, any case. Everything else declines.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
