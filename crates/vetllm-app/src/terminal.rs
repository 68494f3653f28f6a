//! Line-oriented terminal front end for a chat session.
//!
//! Menus are shown as numbered options; `back` steps up a level. Lines
//! starting with `:` are client commands (`:ref`, `:provider <name>`,
//! `:quit`). Everything else is chat input.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use vetllm_flow::{ChatMessage, ChatSession, FlowError, InputOutcome, StateKind};

/// Run the chat loop until `:quit` or end of input.
pub async fn run<R, W>(session: &mut ChatSession, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(
        out,
        "VetLLM chat (provider: {}). Type :quit to exit.",
        session.controller().provider()
    )?;

    loop {
        render_prompt(session, out)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            ":quit" | ":q" => break,
            ":ref" => {
                toggle_reference(session, out)?;
                continue;
            }
            "back" => {
                if let Err(e) = session.controller_mut().back() {
                    writeln!(out, "! {}", e)?;
                }
                continue;
            }
            _ => {}
        }

        if let Some(provider) = line.strip_prefix(":provider") {
            let provider = provider.trim();
            if provider.is_empty() {
                writeln!(out, "provider: {}", session.controller().provider())?;
            } else {
                session.controller_mut().set_provider(provider);
                writeln!(out, "provider set to {}", provider)?;
            }
            continue;
        }
        if line.starts_with(':') {
            writeln!(out, "! unknown command: {}", line)?;
            continue;
        }

        if session.controller().options().is_empty() {
            submit(session, line, out).await?;
        } else {
            select(session, line, out)?;
        }
    }

    Ok(())
}

fn render_prompt<W: Write>(session: &ChatSession, out: &mut W) -> std::io::Result<()> {
    let controller = session.controller();
    let options = controller.options();
    if options.is_empty() {
        writeln!(out, "[{}]", controller.placeholder())?;
    } else {
        writeln!(out)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, option.label)?;
        }
        if controller.state().kind() != StateKind::SelectCategory {
            writeln!(out, "  (back)")?;
        }
    }
    write!(out, "> ")?;
    out.flush()
}

/// Pick a menu entry by number, value or label.
fn select<W: Write>(session: &mut ChatSession, choice: &str, out: &mut W) -> std::io::Result<()> {
    let controller = session.controller_mut();
    let options = controller.options();
    let value = match choice.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].value.clone(),
        _ => options
            .iter()
            .find(|o| o.value == choice || o.label.eq_ignore_ascii_case(choice))
            .map(|o| o.value.clone())
            .unwrap_or_else(|| choice.to_string()),
    };

    let result = if controller.state().kind() == StateKind::SelectCategory {
        controller.select_category(&value)
    } else {
        controller.select_action(&value)
    };
    if let Err(e) = result {
        return writeln!(out, "! {}", e);
    }

    // Multi-step actions open with a prompt.
    if controller.state().kind() == StateKind::MultiStep {
        if let Some(prompt) = controller.messages().last() {
            write_message(out, prompt)?;
        }
    }
    Ok(())
}

async fn submit<W: Write>(session: &mut ChatSession, line: &str, out: &mut W) -> std::io::Result<()> {
    match session.controller_mut().submit_input(line) {
        Ok(InputOutcome::Prompted) => {
            if let Some(prompt) = session.controller().messages().last() {
                write_message(out, prompt)?;
            }
        }
        Ok(InputOutcome::Dispatch(request)) => {
            writeln!(out, "...")?;
            out.flush()?;
            match session.dispatch(request).await {
                Ok(reply) => write_message(out, reply)?,
                Err(e) => writeln!(out, "! {}", e)?,
            }
        }
        Err(FlowError::EmptyInput) => {}
        Err(e) => writeln!(out, "! {}", e)?,
    }
    Ok(())
}

fn toggle_reference<W: Write>(session: &mut ChatSession, out: &mut W) -> std::io::Result<()> {
    let controller = session.controller_mut();
    match controller.toggle_last_reference() {
        Some(true) => {
            let reference = controller
                .messages()
                .iter()
                .rev()
                .find(|m| m.has_reference())
                .and_then(|m| m.reference.as_deref())
                .unwrap_or_default();
            writeln!(out, "--- Reference ---\n{}\n-----------------", reference)
        }
        Some(false) => writeln!(out, "(reference hidden)"),
        None => writeln!(out, "(no reference)"),
    }
}

fn write_message<W: Write>(out: &mut W, message: &ChatMessage) -> std::io::Result<()> {
    writeln!(out, "{}> {}", message.sender, message.text)?;
    if message.has_reference() {
        writeln!(out, "   [Reference available, :ref to show]")?;
    }
    Ok(())
}
