use chrono::NaiveDate;
use habitrack_core::db::open_db_in_memory;
use habitrack_core::service::PROGRESS_ALREADY_RECORDED;
use habitrack_core::{
    build_dashboard, Frequency, GoalId, GoalInput, GoalService, HabitId, HabitInput,
    HabitService, NewUser, ProgressId, ProgressInput, RequestContext, ServiceError, SessionUser,
    SqliteGoalRepository, SqliteHabitRepository, SqliteProgressRepository, SqliteUserRepository,
    UserRepository,
};
use rusqlite::Connection;

type Habits<'c> = HabitService<SqliteHabitRepository<'c>, SqliteProgressRepository<'c>>;
type Goals<'c> = GoalService<SqliteGoalRepository<'c>>;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn habits(conn: &Connection) -> Habits<'_> {
    HabitService::new(
        SqliteHabitRepository::try_new(conn).unwrap(),
        SqliteProgressRepository::try_new(conn).unwrap(),
    )
}

fn goals(conn: &Connection) -> Goals<'_> {
    GoalService::new(SqliteGoalRepository::try_new(conn).unwrap())
}

fn sign_up(conn: &Connection, username: &str) -> RequestContext {
    let user = SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$placeholder".to_string(),
        })
        .unwrap();
    RequestContext::authenticated(SessionUser::from(&user))
}

fn habit_input(title: &str, frequency: &str) -> HabitInput {
    HabitInput {
        title: title.to_string(),
        description: String::new(),
        frequency: frequency.to_string(),
    }
}

fn progress_input(date: &str, done: bool) -> ProgressInput {
    ProgressInput {
        date: date.to_string(),
        status: done.then(|| "on".to_string()),
    }
}

fn goal_input(title: &str, target: &str, percentage: &str, done: bool) -> GoalInput {
    GoalInput {
        title: title.to_string(),
        description: String::new(),
        target_date: target.to_string(),
        is_completed: done.then(|| "on".to_string()),
        progress_percentage: percentage.to_string(),
        progress_notes: String::new(),
    }
}

#[test]
fn anonymous_requests_are_rejected_before_any_lookup() {
    let conn = open_db_in_memory().unwrap();
    let anonymous = RequestContext::anonymous();

    assert!(matches!(
        habits(&conn).list_habits(&anonymous).unwrap_err(),
        ServiceError::Unauthenticated
    ));
    assert!(matches!(
        goals(&conn).get_goal(&anonymous, GoalId(1)).unwrap_err(),
        ServiceError::Unauthenticated
    ));
}

#[test]
fn foreign_habit_is_reported_like_a_missing_one() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let bob = sign_up(&conn, "bob");
    let service = habits(&conn);
    let habit = service
        .create_habit(&alice, &habit_input("Read", "daily"))
        .unwrap();

    for err in [
        service.get_habit(&bob, habit.id).unwrap_err(),
        service
            .update_habit(&bob, habit.id, &habit_input("Hijacked", "daily"))
            .unwrap_err(),
        service.delete_habit(&bob, habit.id).unwrap_err(),
        service.list_progress(&bob, habit.id).unwrap_err(),
        service
            .record_progress(&bob, habit.id, &progress_input("2024-01-01", true))
            .unwrap_err(),
        service.get_habit(&bob, HabitId(9999)).unwrap_err(),
    ] {
        assert!(matches!(err, ServiceError::NotFound), "unexpected: {err}");
    }

    let untouched = service.get_habit(&alice, habit.id).unwrap();
    assert_eq!(untouched.title, "Read");
    assert!(service.list_progress(&alice, habit.id).unwrap().1.is_empty());
}

#[test]
fn invalid_edit_of_foreign_habit_is_still_not_found() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let bob = sign_up(&conn, "bob");
    let service = habits(&conn);
    let habit = service
        .create_habit(&alice, &habit_input("Read", "daily"))
        .unwrap();

    let err = service
        .update_habit(&bob, habit.id, &habit_input("", "hourly"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}

#[test]
fn duplicate_progress_date_becomes_a_date_field_error() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let service = habits(&conn);
    let habit = service
        .create_habit(&alice, &habit_input("Read", "daily"))
        .unwrap();

    service
        .record_progress(&alice, habit.id, &progress_input("2024-03-01", true))
        .unwrap();
    let err = service
        .record_progress(&alice, habit.id, &progress_input("2024-03-01", false))
        .unwrap_err();

    match err {
        ServiceError::Validation(errors) => {
            assert_eq!(
                errors.for_field("date").collect::<Vec<_>>(),
                vec![PROGRESS_ALREADY_RECORDED]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.list_progress(&alice, habit.id).unwrap().1.len(), 1);
}

#[test]
fn progress_status_toggle_checks_the_entry_belongs_to_the_habit() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let service = habits(&conn);
    let read = service
        .create_habit(&alice, &habit_input("Read", "daily"))
        .unwrap();
    let run = service
        .create_habit(&alice, &habit_input("Run", "daily"))
        .unwrap();
    let entry = service
        .record_progress(&alice, read.id, &progress_input("2024-03-01", false))
        .unwrap();

    let toggled = service
        .set_progress_status(&alice, read.id, entry.id, true)
        .unwrap();
    assert!(toggled.status);

    let wrong_habit = service
        .set_progress_status(&alice, run.id, entry.id, false)
        .unwrap_err();
    assert!(matches!(wrong_habit, ServiceError::NotFound));
    let missing = service
        .set_progress_status(&alice, read.id, ProgressId(777), false)
        .unwrap_err();
    assert!(matches!(missing, ServiceError::NotFound));
}

#[test]
fn summary_reports_truncated_percentage() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let service = habits(&conn);
    let habit = service
        .create_habit(&alice, &habit_input("Read", "daily"))
        .unwrap();

    let empty = service.summary(&alice, habit.id, day(2024, 3, 3)).unwrap();
    assert_eq!((empty.completed_count, empty.total_count, empty.percent), (0, 0, 0));

    for (date, done) in [("2024-03-01", true), ("2024-03-02", false), ("2024-03-03", false)] {
        service
            .record_progress(&alice, habit.id, &progress_input(date, done))
            .unwrap();
    }
    let summary = service.summary(&alice, habit.id, day(2024, 3, 3)).unwrap();
    assert_eq!(summary.completed_count, 1);
    assert_eq!(summary.total_count, 3);
    assert_eq!(summary.percent, 33);
}

#[test]
fn deleting_habit_reports_removed_entries() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let service = habits(&conn);
    let habit = service
        .create_habit(&alice, &habit_input("Read", "weekly"))
        .unwrap();
    service
        .record_progress(&alice, habit.id, &progress_input("2024-03-01", true))
        .unwrap();

    assert_eq!(service.delete_habit(&alice, habit.id).unwrap(), 1);
    assert!(matches!(
        service.get_habit(&alice, habit.id).unwrap_err(),
        ServiceError::NotFound
    ));
}

#[test]
fn goal_percentage_out_of_range_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let service = goals(&conn);

    let err = service
        .create_goal(&alice, &goal_input("Marathon", "2025-04-01", "101", false))
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::Validation(ref errors) if errors.has_field("progress_percentage"))
    );
    assert!(service.list_goals(&alice).unwrap().is_empty());

    let goal = service
        .create_goal(&alice, &goal_input("Marathon", "2025-04-01", "100", true))
        .unwrap();
    assert_eq!(goal.progress_percentage, 100);
    assert!(goal.is_completed);
}

#[test]
fn foreign_goal_cannot_be_edited_or_deleted() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let bob = sign_up(&conn, "bob");
    let service = goals(&conn);
    let goal = service
        .create_goal(&alice, &goal_input("Savings", "2024-12-31", "", false))
        .unwrap();
    assert_eq!(goal.progress_percentage, 0);

    assert!(matches!(
        service
            .update_goal(&bob, goal.id, &goal_input("Mine", "2024-12-31", "50", false))
            .unwrap_err(),
        ServiceError::NotFound
    ));
    assert!(matches!(
        service.delete_goal(&bob, goal.id).unwrap_err(),
        ServiceError::NotFound
    ));
    assert!(service.list_goals(&bob).unwrap().is_empty());

    let updated = service
        .update_goal(&alice, goal.id, &goal_input("Savings", "2025-01-31", "40", false))
        .unwrap();
    assert_eq!(updated.target_date, day(2025, 1, 31));
    service.delete_goal(&alice, goal.id).unwrap();
    assert!(service.list_goals(&alice).unwrap().is_empty());
}

#[test]
fn dashboard_only_shows_the_acting_users_data() {
    let conn = open_db_in_memory().unwrap();
    let alice = sign_up(&conn, "alice");
    let bob = sign_up(&conn, "bob");
    let habit_service = habits(&conn);
    let goal_service = goals(&conn);

    let read = habit_service
        .create_habit(&alice, &habit_input("Read", "Daily"))
        .unwrap();
    assert_eq!(read.frequency, Frequency::Daily);
    for date in ["2024-03-09", "2024-03-10"] {
        habit_service
            .record_progress(&alice, read.id, &progress_input(date, true))
            .unwrap();
    }
    goal_service
        .create_goal(&alice, &goal_input("Book list", "2024-06-30", "20", false))
        .unwrap();
    goal_service
        .create_goal(&alice, &goal_input("Library card", "2024-01-31", "100", true))
        .unwrap();
    habit_service
        .create_habit(&bob, &habit_input("Run", "weekly"))
        .unwrap();

    let dashboard = build_dashboard(&alice, &habit_service, &goal_service, day(2024, 3, 10)).unwrap();
    assert_eq!(dashboard.username, "alice");
    assert_eq!(dashboard.summaries.len(), 1);
    assert_eq!(dashboard.summaries[0].percent, 100);
    assert_eq!(dashboard.best_streak, 2);
    assert_eq!(dashboard.goals.len(), 2);
    assert_eq!(dashboard.completed_goals, 1);

    let bobs = build_dashboard(&bob, &habit_service, &goal_service, day(2024, 3, 10)).unwrap();
    assert_eq!(bobs.summaries.len(), 1);
    assert_eq!(bobs.summaries[0].total_count, 0);
    assert!(bobs.goals.is_empty());
    assert_eq!(bobs.best_streak, 0);
}
