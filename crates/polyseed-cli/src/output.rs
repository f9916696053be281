//! Output formatting for human-readable and JSON modes.
//!
//! Human mode uses colored terminal output.
//! JSON mode outputs pure JSON with no ANSI escapes.

use colored::Colorize;
use serde::Serialize;

/// Prints a success message in human mode.
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Prints a single key-value pair in human mode.
pub fn print_kv(key: &str, value: &str) {
    println!("{}: {}", key.bold(), value);
}

/// Prints a phrase on its own line, highlighted in human mode.
pub fn print_phrase(phrase: &str) {
    println!();
    println!("  {}", phrase.bold());
    println!();
}

/// Prints a serializable value as compact JSON.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("{{\"error\":\"json serialization failed: {e}\"}}"),
    }
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{}", obj);
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}

/// Prints a table of rows in human mode, JSON array in JSON mode.
pub fn print_table(headers: &[&str], rows: &[Vec<String>], json_mode: bool) {
    if json_mode {
        let arr: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (i, h) in headers.iter().enumerate() {
                    let val = row.get(i).cloned().unwrap_or_default();
                    obj.insert(h.to_string(), serde_json::Value::String(val));
                }
                serde_json::Value::Object(obj)
            })
            .collect();
        println!("{}", serde_json::Value::Array(arr));
        return;
    }

    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    // Column widths in characters; native names are not ASCII.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if i < widths.len() && len > widths[i] {
                widths[i] = len;
            }
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<w$}", h.to_uppercase(), w = widths[i]))
        .collect();
    println!("{}", header_line.join("  ").bold());

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", sep.join("  ").dimmed());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:<w$}", cell, w = w)
            })
            .collect();
        println!("{}", line.join("  "));
    }
}
