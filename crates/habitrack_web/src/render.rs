//! Server-side HTML rendering.
//!
//! Every user-supplied string goes through [`escape`] before it is placed
//! into markup.

use chrono::NaiveDate;
use habitrack_core::validate::format_date;
use habitrack_core::{
    Dashboard, Frequency, Goal, GoalInput, Habit, HabitInput, HabitProgress, HabitSummary,
    LoginInput, ProgressInput, RegistrationInput, SessionUser, ValidationErrors,
};

/// Per-request page frame: who is signed in and the pending flash message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chrome<'a> {
    pub user: Option<&'a SessionUser>,
    pub flash: Option<&'static str>,
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn layout(chrome: Chrome<'_>, title: &str, body: &str) -> String {
    let nav = match chrome.user {
        Some(user) => format!(
            r#"<a href="/dashboard/">Dashboard</a> <a href="/habits/">Habits</a> <a href="/goals/">Goals</a>
<span>Signed in as {}</span>
<form method="post" action="/logout/" class="inline"><button type="submit">Log out</button></form>"#,
            escape(&user.username)
        ),
        None => r#"<a href="/">Log in or register</a>"#.to_string(),
    };
    let flash = chrome
        .flash
        .map(|message| format!(r#"<p class="flash">{}</p>"#, escape(message)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} | Habitrack</title></head>
<body>
<nav>{nav}</nav>
{flash}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn field_errors(errors: Option<&ValidationErrors>, field: &str) -> String {
    let Some(errors) = errors else {
        return String::new();
    };
    let items: String = errors
        .for_field(field)
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!(r#"<ul class="errors">{items}</ul>"#)
    }
}

fn form_errors(errors: Option<&ValidationErrors>) -> String {
    let Some(errors) = errors else {
        return String::new();
    };
    let items: String = errors
        .form_errors()
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!(r#"<ul class="errors form-errors">{items}</ul>"#)
    }
}

fn input(
    label: &str,
    kind: &str,
    name: &str,
    value: &str,
    errors: Option<&ValidationErrors>,
) -> String {
    input_with_id(label, kind, name, &format!("id_{name}"), value, errors)
}

/// For pages that carry two forms with a field of the same name.
fn input_with_id(
    label: &str,
    kind: &str,
    name: &str,
    id: &str,
    value: &str,
    errors: Option<&ValidationErrors>,
) -> String {
    format!(
        r#"<p><label for="{id}">{label}</label>
<input type="{kind}" name="{name}" id="{id}" value="{value}">{errors}</p>
"#,
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

fn textarea(label: &str, name: &str, value: &str, errors: Option<&ValidationErrors>) -> String {
    format!(
        r#"<p><label for="id_{name}">{label}</label>
<textarea name="{name}" id="id_{name}">{value}</textarea>{errors}</p>
"#,
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

fn checkbox(label: &str, name: &str, checked: bool) -> String {
    let checked = if checked { " checked" } else { "" };
    format!(
        r#"<p><label><input type="checkbox" name="{name}" value="on"{checked}> {label}</label></p>
"#
    )
}

fn frequency_select(selected: &str, errors: Option<&ValidationErrors>) -> String {
    let selected = Frequency::parse(selected);
    let options: String = Frequency::ALL
        .into_iter()
        .map(|frequency| {
            let marker = if Some(frequency) == selected {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{marker}>{}</option>"#,
                frequency.as_str(),
                frequency.label()
            )
        })
        .collect();
    format!(
        r#"<p><label for="id_frequency">Frequency</label>
<select name="frequency" id="id_frequency">{options}</select>{errors}</p>
"#,
        errors = field_errors(errors, "frequency"),
    )
}

fn is_checked(value: Option<&str>) -> bool {
    habitrack_core::validate::checkbox(value)
}

/// Login and registration forms for anonymous visitors.
pub fn home_anonymous(
    chrome: Chrome<'_>,
    login: &LoginInput,
    login_errors: Option<&ValidationErrors>,
    registration: &RegistrationInput,
    registration_errors: Option<&ValidationErrors>,
) -> String {
    let body = format!(
        r#"<section id="login">
<h2>Log in</h2>
<form method="post" action="/login/">
{login_form_errors}{login_username}<p><label for="id_login_password">Password</label>
<input type="password" name="password" id="id_login_password">{login_password_errors}</p>
<button type="submit" name="login" value="1">Log in</button>
</form>
</section>
<section id="register">
<h2>Create an account</h2>
<form method="post" action="/register/">
{register_form_errors}{register_username}{register_email}<p><label for="id_password">Password</label>
<input type="password" name="password" id="id_password">{password_errors}</p>
<p><label for="id_password_confirm">Confirm password</label>
<input type="password" name="password_confirm" id="id_password_confirm">{confirm_errors}</p>
<button type="submit" name="register" value="1">Register</button>
</form>
</section>
"#,
        login_form_errors = form_errors(login_errors),
        login_username = input_with_id(
            "Username",
            "text",
            "username",
            "id_login_username",
            &login.username,
            login_errors
        ),
        login_password_errors = field_errors(login_errors, "password"),
        register_form_errors = form_errors(registration_errors),
        register_username = input(
            "Username",
            "text",
            "username",
            &registration.username,
            registration_errors
        ),
        register_email = input(
            "Email",
            "email",
            "email",
            &registration.email,
            registration_errors
        ),
        password_errors = field_errors(registration_errors, "password"),
        confirm_errors = field_errors(registration_errors, "password_confirm"),
    );
    layout(chrome, "Welcome to Habitrack", &body)
}

pub fn dashboard(chrome: Chrome<'_>, dashboard: &Dashboard, today: NaiveDate) -> String {
    let habits = if dashboard.summaries.is_empty() {
        r#"<p>No habits yet. <a href="/habits/add/">Add one</a>.</p>"#.to_string()
    } else {
        let rows: String = dashboard.summaries.iter().map(summary_row).collect();
        format!("<table>{SUMMARY_HEADER}{rows}</table>")
    };
    let goals = if dashboard.goals.is_empty() {
        r#"<p>No goals yet. <a href="/goals/add/">Add one</a>.</p>"#.to_string()
    } else {
        let rows: String = dashboard
            .goals
            .iter()
            .map(|goal| goal_row(goal, today))
            .collect();
        format!("<table>{GOAL_HEADER}{rows}</table>")
    };
    let body = format!(
        r#"<p>Hello, {username}. Best current streak: {streak}. Goals completed: {completed} of {total}.</p>
<h2>Habits</h2>
{habits}
<h2>Goals</h2>
{goals}
<p><a href="/account/delete/">Delete account</a></p>
"#,
        username = escape(&dashboard.username),
        streak = dashboard.best_streak,
        completed = dashboard.completed_goals,
        total = dashboard.goals.len(),
    );
    layout(chrome, "Dashboard", &body)
}

const SUMMARY_HEADER: &str =
    "<tr><th>Habit</th><th>Frequency</th><th>Completed</th><th>Progress</th><th>Streak</th><th></th></tr>";
const GOAL_HEADER: &str =
    "<tr><th>Goal</th><th>Target date</th><th>Progress</th><th>Status</th><th></th></tr>";

fn summary_row(summary: &HabitSummary) -> String {
    let habit = &summary.habit;
    format!(
        r#"<tr><td>{title}</td><td>{frequency}</td><td>{completed}/{total}</td><td>{percent}%</td><td>{streak}</td>
<td><a href="/habits/{id}/progress/">Progress</a> <a href="/habits/{id}/edit/">Edit</a> <a href="/habits/{id}/delete/">Delete</a></td></tr>
"#,
        title = escape(&habit.title),
        frequency = habit.frequency.label(),
        completed = summary.completed_count,
        total = summary.total_count,
        percent = summary.percent,
        streak = summary.current_streak,
        id = habit.id,
    )
}

fn goal_row(goal: &Goal, today: NaiveDate) -> String {
    let status = if goal.is_completed {
        "Completed"
    } else if goal.is_overdue(today) {
        "Overdue"
    } else {
        "In progress"
    };
    format!(
        r#"<tr><td>{title}</td><td>{target}</td><td>{percent}%</td><td>{status}</td>
<td><a href="/goals/{id}/edit/">Edit</a> <a href="/goals/{id}/delete/">Delete</a></td></tr>
"#,
        title = escape(&goal.title),
        target = format_date(goal.target_date),
        percent = goal.progress_percentage,
        id = goal.id,
    )
}

pub fn habit_list(chrome: Chrome<'_>, summaries: &[HabitSummary]) -> String {
    let table = if summaries.is_empty() {
        "<p>You are not tracking any habits yet.</p>".to_string()
    } else {
        let rows: String = summaries.iter().map(summary_row).collect();
        format!("<table>{SUMMARY_HEADER}{rows}</table>")
    };
    let body = format!(r#"<p><a href="/habits/add/">Add habit</a></p>{table}"#);
    layout(chrome, "Habits", &body)
}

pub fn habit_form(
    chrome: Chrome<'_>,
    heading: &str,
    action: &str,
    habit: &HabitInput,
    errors: Option<&ValidationErrors>,
) -> String {
    let body = format!(
        r#"<form method="post" action="{action}">
{form_errors}{title}{description}{frequency}<button type="submit">Save</button>
<a href="/habits/">Cancel</a>
</form>
"#,
        action = escape(action),
        form_errors = form_errors(errors),
        title = input("Title", "text", "title", &habit.title, errors),
        description = textarea("Description", "description", &habit.description, errors),
        frequency = frequency_select(&habit.frequency, errors),
    );
    layout(chrome, heading, &body)
}

/// Confirmation page for a destructive action.
pub fn confirm_delete(
    chrome: Chrome<'_>,
    heading: &str,
    subject: &str,
    action: &str,
    cancel: &str,
) -> String {
    let body = format!(
        r#"<p>Are you sure you want to delete "{subject}"?</p>
<form method="post" action="{action}">
<button type="submit">Delete</button>
<a href="{cancel}">Cancel</a>
</form>
"#,
        subject = escape(subject),
        action = escape(action),
        cancel = escape(cancel),
    );
    layout(chrome, heading, &body)
}

pub fn progress_list(chrome: Chrome<'_>, summary: &HabitSummary, entries: &[HabitProgress]) -> String {
    let habit = &summary.habit;
    let rows: String = entries
        .iter()
        .map(|entry| progress_row(habit, entry))
        .collect();
    let table = if entries.is_empty() {
        "<p>No progress recorded yet.</p>".to_string()
    } else {
        format!("<table><tr><th>Date</th><th>Status</th><th></th></tr>{rows}</table>")
    };
    let body = format!(
        r#"<p>{description}</p>
<p>{frequency}. Completed {completed} of {total} ({percent}%). Current streak: {streak}.</p>
<p><a href="/habits/{id}/progress/add/">Record progress</a> <a href="/habits/">Back to habits</a></p>
{table}
"#,
        description = escape(&habit.description),
        frequency = habit.frequency.label(),
        completed = summary.completed_count,
        total = summary.total_count,
        percent = summary.percent,
        streak = summary.current_streak,
        id = habit.id,
    );
    layout(chrome, &habit.title, &body)
}

fn progress_row(habit: &Habit, entry: &HabitProgress) -> String {
    let (label, next, button) = if entry.status {
        ("Completed", "", "Mark not done")
    } else {
        ("Not completed", "on", "Mark done")
    };
    format!(
        r#"<tr><td>{date}</td><td>{label}</td>
<td><form method="post" action="/habits/{habit_id}/progress/{entry_id}/status/" class="inline"><input type="hidden" name="status" value="{next}"><button type="submit">{button}</button></form></td></tr>
"#,
        date = format_date(entry.date),
        habit_id = habit.id,
        entry_id = entry.id,
    )
}

pub fn progress_form(
    chrome: Chrome<'_>,
    habit: &Habit,
    progress: &ProgressInput,
    errors: Option<&ValidationErrors>,
) -> String {
    let body = format!(
        r#"<form method="post" action="/habits/{id}/progress/add/">
{form_errors}{date}{status}<button type="submit">Save</button>
<a href="/habits/{id}/progress/">Cancel</a>
</form>
"#,
        id = habit.id,
        form_errors = form_errors(errors),
        date = input("Date", "date", "date", &progress.date, errors),
        status = checkbox("Completed", "status", is_checked(progress.status.as_deref())),
    );
    layout(chrome, &format!("Record progress: {}", habit.title), &body)
}

pub fn goal_list(chrome: Chrome<'_>, goals: &[Goal], today: NaiveDate) -> String {
    let table = if goals.is_empty() {
        "<p>You have not set any goals yet.</p>".to_string()
    } else {
        let rows: String = goals.iter().map(|goal| goal_row(goal, today)).collect();
        format!("<table>{GOAL_HEADER}{rows}</table>")
    };
    let body = format!(r#"<p><a href="/goals/add/">Add goal</a></p>{table}"#);
    layout(chrome, "Goals", &body)
}

pub fn goal_form(
    chrome: Chrome<'_>,
    heading: &str,
    action: &str,
    goal: &GoalInput,
    errors: Option<&ValidationErrors>,
) -> String {
    let body = format!(
        r#"<form method="post" action="{action}">
{form_errors}{title}{description}{target}{percentage}{completed}{notes}<button type="submit">Save</button>
<a href="/goals/">Cancel</a>
</form>
"#,
        action = escape(action),
        form_errors = form_errors(errors),
        title = input("Title", "text", "title", &goal.title, errors),
        description = textarea("Description", "description", &goal.description, errors),
        target = input("Target date", "date", "target_date", &goal.target_date, errors),
        percentage = input(
            "Progress (%)",
            "number",
            "progress_percentage",
            &goal.progress_percentage,
            errors
        ),
        completed = checkbox("Completed", "is_completed", is_checked(goal.is_completed.as_deref())),
        notes = textarea("Progress notes", "progress_notes", &goal.progress_notes, errors),
    );
    layout(chrome, heading, &body)
}

pub fn not_found() -> String {
    layout(
        Chrome::default(),
        "Not Found",
        "<p>The requested page was not found.</p>",
    )
}

pub fn server_error() -> String {
    layout(
        Chrome::default(),
        "Server Error",
        "<p>Something went wrong. Please try again later.</p>",
    )
}
