//! Terminal rendering of the wizard view

use chatform_core::{ActiveQuestion, TranscriptEntry, ViewModel, Wizard};

/// Print a transcript entry
pub(crate) fn print_entry(entry: &TranscriptEntry) {
    if let Some(statement) = &entry.statement {
        println!("  {statement}");
    }
    if let Some(prompt) = &entry.prompt {
        println!("? {prompt}");
        println!("> {}", entry.answer);
    }
}

/// Print the question awaiting input, numbering any options
pub(crate) fn print_active(question: &ActiveQuestion) {
    if let Some(statement) = &question.statement {
        println!("  {statement}");
    }
    println!("? {}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option.label);
    }
}

/// Print closing statements not shown yet and mark everything new as rendered
///
/// Answered prompts were already on screen when they were asked.
pub(crate) fn flush_new(wizard: &Wizard, view: &ViewModel) {
    for entry in view.new_entries() {
        if entry.prompt.is_none() {
            print_entry(entry);
        }
        wizard.mark_rendered(entry.id);
    }
}

/// Map terminal input onto a submission
///
/// For option questions a 1-based option number selects that option's value.
pub(crate) fn interpret(input: &str, active: Option<&ActiveQuestion>) -> String {
    let trimmed = input.trim();
    let picked = active.and_then(|question| {
        let index = trimmed.parse::<usize>().ok()?.checked_sub(1)?;
        question.options.get(index).map(|o| o.value.clone())
    });
    picked.unwrap_or_else(|| trimmed.to_string())
}
