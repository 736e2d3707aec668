// ABOUTME: Output helpers for eqa-notify
// ABOUTME: Prints toolbar views and dismissal outcomes in the selected format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use eqa_notify::errors::AppResult;
use eqa_notify::formatters::{format_output, OutputFormat, ToolbarView};
use eqa_notify::models::NotificationId;
use eqa_notify::notifications::DismissOutcome;
use serde_json::json;

/// Print a toolbar view
pub fn print_view(view: &ToolbarView, format: OutputFormat) -> AppResult<()> {
    println!("{}", format_output(view, format)?);
    Ok(())
}

/// Print the result of a dismissal
pub fn print_dismissal(id: &NotificationId, outcome: DismissOutcome, format: OutputFormat) -> AppResult<()> {
    let summary = match outcome {
        DismissOutcome::Moved => "dismissed",
        DismissOutcome::NotActive => "already dismissed",
        DismissOutcome::Discarded => "confirmed after session end",
    };
    match format {
        OutputFormat::Text => println!("Notification #{id}: {summary}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "id": id, "outcome": summary }))?
        ),
    }
    Ok(())
}
