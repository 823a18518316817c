use speculate2::speculate;
use taskboard::db::Database;
use taskboard::error::is_unique_violation;
use taskboard::models::*;
use taskboard::ordering::{CoarseAppendShift, FractionalIndex};
use uuid::Uuid;

fn create_user(db: &Database, name: &str) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    db.create_user(name, &email, "not-a-real-hash")
        .expect("Failed to create user")
}

fn create_board(db: &Database, owner: Uuid, title: &str) -> Board {
    db.create_board(
        owner,
        CreateBoardInput {
            title: title.to_string(),
            description: None,
            background_color: None,
        },
    )
    .expect("Failed to create board")
}

fn create_list(db: &Database, board_id: Uuid, title: &str) -> List {
    db.create_list(
        board_id,
        CreateListInput {
            title: title.to_string(),
        },
        &CoarseAppendShift,
    )
    .expect("Failed to create list")
}

fn create_task(db: &Database, list: &List, creator: Uuid, title: &str) -> Task {
    db.create_task(list, creator, CreateTaskInput::titled(title), &CoarseAppendShift)
        .expect("Failed to create task")
}

fn positions(db: &Database, list_id: Uuid) -> Vec<(String, i64)> {
    db.get_tasks_by_list(list_id, None, 1, 100)
        .expect("Query failed")
        .items
        .into_iter()
        .map(|t| (t.title, t.position))
        .collect()
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let alice = create_user(&db, "Alice");
    }

    describe "users" {
        it "finds credentials by email regardless of case" {
            let (user, hash) = db
                .get_user_credentials("ALICE@example.com")
                .expect("Query failed")
                .expect("User missing");

            assert_eq!(user.id, alice.id);
            assert_eq!(hash, "not-a-real-hash");
        }

        it "rejects a duplicate email as a unique violation" {
            let err = db
                .create_user("Other", "alice@example.com", "hash")
                .expect_err("Duplicate email accepted");
            assert!(is_unique_violation(&err));
        }

        it "searches name and email case-insensitively" {
            create_user(&db, "Bob");
            create_user(&db, "Carol");

            let by_name = db.search_users("CAR", 10).expect("Query failed");
            assert_eq!(by_name.len(), 1);
            assert_eq!(by_name[0].name, "Carol");

            let by_email = db.search_users("bob@", 10).expect("Query failed");
            assert_eq!(by_email.len(), 1);
            assert_eq!(by_email[0].name, "Bob");
        }

        it "treats LIKE wildcards in a search literally" {
            create_user(&db, "Bob");
            let results = db.search_users("%", 10).expect("Query failed");
            assert!(results.is_empty());
        }

        it "limits the user listing" {
            for i in 0..5 {
                create_user(&db, &format!("User{i}"));
            }
            let users = db.get_all_users(3).expect("Query failed");
            assert_eq!(users.len(), 3);
        }
    }

    describe "boards" {
        it "makes the owner the first member" {
            let board = create_board(&db, alice.id, "Roadmap");

            assert_eq!(board.owner, alice.id);
            assert_eq!(board.members, vec![alice.id]);
            assert_eq!(board.background_color, DEFAULT_BACKGROUND_COLOR);

            let loaded = db.get_board(board.id).expect("Query failed").expect("Board missing");
            assert_eq!(loaded, board);
        }

        it "lists only boards the user owns or belongs to" {
            let bob = create_user(&db, "Bob");
            let carol = create_user(&db, "Carol");
            let own = create_board(&db, alice.id, "Own");
            let shared = create_board(&db, bob.id, "Shared");
            create_board(&db, carol.id, "Private");
            db.add_board_member(shared.id, alice.id).expect("Failed to add member");

            let page = db.get_boards_for_user(alice.id, None, 1, 10).expect("Query failed");
            let ids: Vec<Uuid> = page.items.iter().map(|b| b.id).collect();

            assert_eq!(page.total, 2);
            assert_eq!(ids, vec![shared.id, own.id]);
        }

        it "hides archived boards" {
            let board = create_board(&db, alice.id, "Old");
            db.update_board(board.id, UpdateBoardInput {
                is_archived: Some(true),
                ..Default::default()
            }).expect("Update failed");

            let page = db.get_boards_for_user(alice.id, None, 1, 10).expect("Query failed");
            assert_eq!(page.total, 0);
            assert!(page.items.is_empty());
        }

        it "filters by title and paginates" {
            for i in 0..3 {
                create_board(&db, alice.id, &format!("Sprint {i}"));
            }
            create_board(&db, alice.id, "Backlog");

            let filtered = db.get_boards_for_user(alice.id, Some("sprint"), 1, 10).expect("Query failed");
            assert_eq!(filtered.total, 3);

            let second = db.get_boards_for_user(alice.id, None, 2, 3).expect("Query failed");
            assert_eq!(second.total, 4);
            assert_eq!(second.items.len(), 1);
            assert_eq!(second.items[0].title, "Sprint 0");
        }

        it "updates only the supplied fields" {
            let board = create_board(&db, alice.id, "Draft");
            let updated = db.update_board(board.id, UpdateBoardInput {
                description: Some(Some("Now with words".to_string())),
                ..Default::default()
            })
            .expect("Update failed")
            .expect("Board missing");

            assert_eq!(updated.title, "Draft");
            assert_eq!(updated.description.as_deref(), Some("Now with words"));
            assert_eq!(updated.owner, alice.id);
        }

        it "returns None when updating a missing board" {
            let result = db.update_board(Uuid::new_v4(), UpdateBoardInput::default()).expect("Query failed");
            assert!(result.is_none());
        }

        it "adds members idempotently" {
            let bob = create_user(&db, "Bob");
            let board = create_board(&db, alice.id, "Team");

            assert!(db.add_board_member(board.id, bob.id).expect("Add failed"));
            assert!(!db.add_board_member(board.id, bob.id).expect("Add failed"));

            let loaded = db.get_board(board.id).expect("Query failed").expect("Board missing");
            assert_eq!(loaded.members, vec![alice.id, bob.id]);
        }

        it "deletes lists, tasks and activities with the board" {
            let board = create_board(&db, alice.id, "Doomed");
            let list = create_list(&db, board.id, "Todo");
            let task = create_task(&db, &list, alice.id, "Write tests");
            db.record_activity(NewActivity::new(
                board.id, alice.id, ActivityAction::CreateTask, TargetType::Task, task.id,
            )).expect("Failed to record activity");

            assert!(db.delete_board(board.id).expect("Delete failed"));

            assert!(db.get_board(board.id).expect("Query failed").is_none());
            assert!(db.get_list(list.id).expect("Query failed").is_none());
            assert!(db.get_task(task.id).expect("Query failed").is_none());
            assert_eq!(db.get_activities_by_board(board.id, 1, 20).expect("Query failed").total, 0);
        }

        it "deletes tasks moved in from another board" {
            let mallory = create_user(&db, "Mallory");
            let target = create_board(&db, alice.id, "Target");
            let target_list = create_list(&db, target.id, "Todo");
            let other = create_board(&db, mallory.id, "Other");
            let other_list = create_list(&db, other.id, "Todo");
            let task = create_task(&db, &other_list, mallory.id, "Stowaway");

            db.move_task(task.id, target_list.id, 0, &CoarseAppendShift)
                .expect("Move failed")
                .expect("Task missing");

            assert!(db.delete_board(target.id).expect("Delete failed"));

            assert!(db.get_list(target_list.id).expect("Query failed").is_none());
            assert!(db.get_task(task.id).expect("Query failed").is_none());
            assert!(db.get_list(other_list.id).expect("Query failed").is_some());
        }

        it "reports false when deleting a missing board" {
            assert!(!db.delete_board(Uuid::new_v4()).expect("Delete failed"));
        }
    }

    describe "lists" {
        before {
            let board = create_board(&db, alice.id, "Sprint 1");
        }

        it "appends lists at increasing positions starting from zero" {
            let todo = create_list(&db, board.id, "Todo");
            let doing = create_list(&db, board.id, "Doing");
            let done = create_list(&db, board.id, "Done");

            assert_eq!((todo.position, doing.position, done.position), (0, 1, 2));

            let titles: Vec<String> = db.get_lists_by_board(board.id)
                .expect("Query failed")
                .into_iter()
                .map(|l| l.title)
                .collect();
            assert_eq!(titles, vec!["Todo", "Doing", "Done"]);
        }

        it "counts archived lists when appending but hides them" {
            let old = create_list(&db, board.id, "Old");
            db.update_list(old.id, UpdateListInput {
                is_archived: Some(true),
                ..Default::default()
            }).expect("Update failed");

            let next = create_list(&db, board.id, "Next");

            assert_eq!(next.position, 1);
            let lists = db.get_lists_by_board(board.id).expect("Query failed");
            assert_eq!(lists.len(), 1);
            assert_eq!(lists[0].id, next.id);
        }

        it "deletes a list with its tasks and leaves siblings alone" {
            let todo = create_list(&db, board.id, "Todo");
            let doing = create_list(&db, board.id, "Doing");
            let done = create_list(&db, board.id, "Done");
            let task = create_task(&db, &doing, alice.id, "In flight");

            assert!(db.delete_list(doing.id).expect("Delete failed"));

            assert!(db.get_task(task.id).expect("Query failed").is_none());
            let remaining: Vec<(Uuid, i64)> = db.get_lists_by_board(board.id)
                .expect("Query failed")
                .into_iter()
                .map(|l| (l.id, l.position))
                .collect();
            assert_eq!(remaining, vec![(todo.id, 0), (done.id, 2)]);
        }
    }

    describe "tasks" {
        before {
            let board = create_board(&db, alice.id, "Sprint 1");
            let todo = create_list(&db, board.id, "Todo");
            let doing = create_list(&db, board.id, "Doing");
        }

        it "inherits the board from its list and appends at the end" {
            let first = create_task(&db, &todo, alice.id, "First");
            let second = create_task(&db, &todo, alice.id, "Second");

            assert_eq!(first.board_id, board.id);
            assert_eq!(first.created_by, alice.id);
            assert_eq!(first.priority, Priority::Medium);
            assert_eq!((first.position, second.position), (0, 1));
        }

        it "searches task titles within a list" {
            create_task(&db, &todo, alice.id, "Fix login");
            create_task(&db, &todo, alice.id, "Write docs");
            create_task(&db, &doing, alice.id, "Fix signup");

            let page = db.get_tasks_by_list(todo.id, Some("FIX"), 1, 50).expect("Query failed");
            assert_eq!(page.total, 1);
            assert_eq!(page.items[0].title, "Fix login");
        }

        it "lists board tasks newest first" {
            create_task(&db, &todo, alice.id, "Older");
            create_task(&db, &doing, alice.id, "Newer");

            let titles: Vec<String> = db.get_tasks_by_board(board.id)
                .expect("Query failed")
                .into_iter()
                .map(|t| t.title)
                .collect();
            assert_eq!(titles, vec!["Newer", "Older"]);
        }

        it "persists updates to assignees, labels and priority" {
            let bob = create_user(&db, "Bob");
            let task = create_task(&db, &todo, alice.id, "Ship it");

            let updated = db.update_task(task.id, UpdateTaskInput {
                assigned_to: Some(vec![bob.id]),
                labels: Some(vec!["release".to_string()]),
                priority: Some(Priority::Urgent),
                ..Default::default()
            })
            .expect("Update failed")
            .expect("Task missing");

            let loaded = db.get_task(task.id).expect("Query failed").expect("Task missing");
            assert_eq!(loaded, updated);
            assert_eq!(loaded.assigned_to, vec![bob.id]);
            assert_eq!(loaded.labels, vec!["release".to_string()]);
            assert_eq!(loaded.priority, Priority::Urgent);
            assert_eq!(loaded.title, "Ship it");
        }

        it "clears nullable fields set to null" {
            let mut input = CreateTaskInput::titled("Dated");
            input.description = Some("x".to_string());
            input.due_date = Some("2030-01-01T00:00:00Z".parse().expect("Bad date"));
            let task = db.create_task(&todo, alice.id, input, &CoarseAppendShift)
                .expect("Failed to create task");

            let updated = db.update_task(task.id, UpdateTaskInput {
                description: Some(None),
                due_date: Some(None),
                ..Default::default()
            })
            .expect("Update failed")
            .expect("Task missing");

            assert_eq!(updated.description, None);
            assert_eq!(updated.due_date, None);
            let loaded = db.get_task(task.id).expect("Query failed").expect("Task missing");
            assert_eq!(loaded, updated);
        }

        it "appends after the largest allowed position" {
            let task = create_task(&db, &todo, alice.id, "Far");
            db.move_task(task.id, todo.id, MAX_POSITION, &CoarseAppendShift)
                .expect("Move failed")
                .expect("Task missing");

            let next = create_task(&db, &todo, alice.id, "Next");
            assert_eq!(next.position, MAX_POSITION + 1);
        }

        it "leaves siblings untouched on a same-list move" {
            let a = create_task(&db, &todo, alice.id, "A");
            create_task(&db, &todo, alice.id, "B");
            create_task(&db, &todo, alice.id, "C");

            let moved = db.move_task(a.id, todo.id, 2, &CoarseAppendShift)
                .expect("Move failed")
                .expect("Task missing");

            assert_eq!(moved.from_list_id, todo.id);
            assert_eq!(moved.task.position, 2);
            let mut rows = positions(&db, todo.id);
            rows.sort();
            assert_eq!(rows, vec![("A".into(), 2), ("B".into(), 1), ("C".into(), 2)]);
        }

        it "compacts the source list on a cross-list move" {
            create_task(&db, &todo, alice.id, "A");
            let b = create_task(&db, &todo, alice.id, "B");
            create_task(&db, &todo, alice.id, "C");
            create_task(&db, &todo, alice.id, "D");
            create_task(&db, &doing, alice.id, "X");

            let moved = db.move_task(b.id, doing.id, 0, &CoarseAppendShift)
                .expect("Move failed")
                .expect("Task missing");

            assert_eq!(moved.from_list_id, todo.id);
            assert_eq!(moved.task.list_id, doing.id);
            assert_eq!(moved.task.board_id, board.id);
            assert_eq!(positions(&db, todo.id), vec![("A".into(), 0), ("C".into(), 1), ("D".into(), 2)]);

            let mut dest = positions(&db, doing.id);
            dest.sort();
            assert_eq!(dest, vec![("B".into(), 0), ("X".into(), 0)]);
        }

        it "keeps destination positions strictly increasing with fractional keys" {
            let a = db.create_task(&todo, alice.id, CreateTaskInput::titled("A"), &FractionalIndex).expect("Create failed");
            db.create_task(&doing, alice.id, CreateTaskInput::titled("X"), &FractionalIndex).expect("Create failed");
            db.create_task(&doing, alice.id, CreateTaskInput::titled("Y"), &FractionalIndex).expect("Create failed");

            db.move_task(a.id, doing.id, 1, &FractionalIndex).expect("Move failed");

            let rows = positions(&db, doing.id);
            let titles: Vec<&str> = rows.iter().map(|(t, _)| t.as_str()).collect();
            assert_eq!(titles, vec!["X", "A", "Y"]);
            assert!(rows.windows(2).all(|w| w[0].1 < w[1].1));
        }

        it "returns None when moving a missing task" {
            let result = db.move_task(Uuid::new_v4(), todo.id, 0, &CoarseAppendShift).expect("Move failed");
            assert!(result.is_none());
        }

        it "deletes a single task without renumbering" {
            create_task(&db, &todo, alice.id, "A");
            let b = create_task(&db, &todo, alice.id, "B");
            create_task(&db, &todo, alice.id, "C");

            assert!(db.delete_task(b.id).expect("Delete failed"));
            assert_eq!(positions(&db, todo.id), vec![("A".into(), 0), ("C".into(), 2)]);
        }
    }

    describe "activities" {
        it "returns a board's activities newest first with a total" {
            let board = create_board(&db, alice.id, "Audit");
            for action in [ActivityAction::CreateBoard, ActivityAction::UpdateBoard, ActivityAction::AddMember] {
                db.record_activity(
                    NewActivity::new(board.id, alice.id, action, TargetType::Board, board.id)
                        .with_details(serde_json::json!({ "n": action.as_str() })),
                ).expect("Failed to record activity");
            }

            let page = db.get_activities_by_board(board.id, 1, 2).expect("Query failed");

            assert_eq!(page.total, 3);
            assert_eq!(page.items.len(), 2);
            assert_eq!(page.items[0].action, ActivityAction::AddMember);
            assert_eq!(page.items[0].details["n"], "add_member");
            assert_eq!(page.items[1].action, ActivityAction::UpdateBoard);
        }
    }
}

#[test]
fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("taskboard.db");

    let user_id = {
        let db = Database::open(path.clone()).expect("Failed to open");
        db.migrate().expect("Failed to migrate");
        create_user(&db, "Dana").id
    };

    let db = Database::open(path).expect("Failed to reopen");
    db.migrate().expect("Failed to migrate again");
    let user = db.get_user(user_id).expect("Query failed").expect("User missing");
    assert_eq!(user.name, "Dana");
}
