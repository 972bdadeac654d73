//! Terminal rendering of records, totals and the running session.

use ansi_term::{Colour, Style};

use crate::{
    export::{
        summary::summarize,
        table::{records_table, totals_table},
    },
    storage::entities::Record,
    tracker::{activity::Activity, state::SessionState},
    utils::{reference_clock::ClockReadout, time::format_seconds},
};

fn print_table(lines: Vec<String>) {
    let mut lines = lines.into_iter();
    if let Some(header) = lines.next() {
        println!("{}", Style::new().bold().paint(header));
    }
    for line in lines {
        println!("{line}");
    }
}

pub fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("No records yet");
        return;
    }
    print_table(records_table(records));
}

pub fn print_summary(records: &[Record]) {
    print_table(totals_table(&summarize(records)));
}

pub fn print_activity_menu() {
    println!("{}", Colour::Green.paint("Select an activity:"));
    for activity in Activity::ALL {
        println!("  {}) {activity}", activity.menu_index());
    }
}

pub fn print_session(state: &SessionState) {
    println!("Session: {}", Colour::Green.bold().paint(state.phase.to_string()));
    if let Some(activity) = state.activity {
        println!("Activity: {activity}");
    }
    if let Some(start) = state.start_time {
        println!("Started: {}", start.format("%Y-%m-%d %H:%M:%S"));
    }
    println!(
        "Active: {}\tInactive: {}",
        format_seconds(state.active_seconds),
        format_seconds(state.inactive_seconds)
    );
}

pub fn print_readout(readout: &ClockReadout) {
    println!("{readout}");
}

pub fn print_record_saved(record: &Record) {
    println!(
        "{} {} for {} (inactive {})",
        Colour::Green.paint("Saved"),
        record.activity,
        format_seconds(record.active_seconds),
        format_seconds(record.inactive_seconds)
    );
}
