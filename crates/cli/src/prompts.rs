use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal, Write};

/// How many times an unrecognised answer is asked again before giving up.
pub const MAX_REPROMPTS: usize = 5;

pub fn confirm(message: &str, force: bool) -> Result<bool> {
  if force {
    return Ok(true);
  }

  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    bail!("Cannot prompt for confirmation in non-interactive mode. Use --no-warn to proceed.");
  }

  confirm_with(message, &mut io::stdin().lock(), &mut io::stderr())
}

/// Ask `message` on `output` and read the answer from `input`.
///
/// An empty answer, end of input or too many unrecognised answers mean no.
pub fn confirm_with(message: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
  for attempt in 0..=MAX_REPROMPTS {
    if attempt > 0 {
      writeln!(output, "Please answer 'y' or 'n'")?;
    }
    write!(output, "{} [y/N] ", message)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
      return Ok(false);
    }

    match answer.trim().to_ascii_lowercase().as_str() {
      "y" | "yes" => return Ok(true),
      "" | "n" | "no" => return Ok(false),
      _ => {}
    }
  }

  writeln!(output, "No valid answer given")?;
  Ok(false)
}
