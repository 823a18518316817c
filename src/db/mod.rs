mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;
use crate::ordering::{MoveRequest, Positioner, Slot};

/// One page of a paginated query plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Result of a successful move.
#[derive(Debug, Clone)]
pub struct MovedTask {
    pub task: Task,
    /// The list the task was in before the move.
    pub from_list_id: Uuid,
}

const USER_COLUMNS: &str = "id, name, email, avatar, created_at";
const BOARD_COLUMNS: &str =
    "id, title, description, owner_id, background_color, is_archived, created_at, updated_at";
const LIST_COLUMNS: &str = "id, title, board_id, position, is_archived, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, description, list_id, board_id, assigned_to, position, \
     priority, due_date, labels, is_archived, created_by, created_at, updated_at";
const ACTIVITY_COLUMNS: &str =
    "id, board_id, user_id, action, target_type, target_id, details, created_at";

/// SQLite-backed store for users, boards, lists, tasks, and activities.
///
/// A single connection is shared behind a mutex, so every method sees a
/// consistent snapshot for its own duration. Multi-step writes (task moves,
/// cascading deletes) run inside one transaction each.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        schema::run_migrations(&conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let conn = self.conn()?;
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, avatar, created_at)
             VALUES (?, ?, ?, ?, NULL, ?)",
            (id.to_string(), name, email, password_hash, now.to_rfc3339()),
        )?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            avatar: None,
            created_at: now,
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Look up a user by email together with their password hash.
    pub fn get_user_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"),
                [email.to_lowercase()],
                |row| Ok((user_from_row(row)?, row.get::<_, String>(5)?)),
            )
            .optional()?;
        Ok(found)
    }

    /// Case-insensitive substring match on name or email.
    pub fn search_users(&self, query: &str, limit: u32) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE lower(email) LIKE ?1 ESCAPE '\\' OR lower(name) LIKE ?1 ESCAPE '\\'
             ORDER BY name LIMIT ?2"
        ))?;

        let users = stmt
            .query_map(params![like_pattern(query), limit], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    pub fn get_all_users(&self, limit: u32) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid LIMIT ?"
        ))?;

        let users = stmt
            .query_map([limit], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    // ============================================================
    // Board operations
    // ============================================================

    /// Boards the user owns or is a member of, excluding archived ones,
    /// newest first.
    pub fn get_boards_for_user(
        &self,
        user_id: Uuid,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Page<Board>> {
        let conn = self.conn()?;
        let filter = "is_archived = 0
             AND (owner_id = ?1 OR EXISTS (
                 SELECT 1 FROM board_members m WHERE m.board_id = boards.id AND m.user_id = ?1))
             AND (?2 IS NULL OR lower(title) LIKE ?2 ESCAPE '\\')";
        let pattern = search.filter(|s| !s.is_empty()).map(like_pattern);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM boards WHERE {filter}"),
            params![user_id.to_string(), pattern],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE {filter}
             ORDER BY created_at DESC, rowid DESC LIMIT ?3 OFFSET ?4"
        ))?;
        let mut boards = stmt
            .query_map(
                params![user_id.to_string(), pattern, limit, page_offset(page, limit)],
                board_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        for board in &mut boards {
            board.members = query_members(&conn, board.id)?;
        }

        Ok(Page {
            items: boards,
            total: total.max(0) as u64,
        })
    }

    pub fn get_board(&self, id: Uuid) -> Result<Option<Board>> {
        let conn = self.conn()?;
        query_board(&conn, id)
    }

    /// Create a board. The owner becomes its first member.
    pub fn create_board(&self, owner: Uuid, input: CreateBoardInput) -> Result<Board> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let background_color = input
            .background_color
            .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string());

        tx.execute(
            "INSERT INTO boards (id, title, description, owner_id, background_color, is_archived,
                                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
            (
                id.to_string(),
                &input.title,
                &input.description,
                owner.to_string(),
                &background_color,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        tx.execute(
            "INSERT INTO board_members (board_id, user_id, added_at) VALUES (?, ?, ?)",
            (id.to_string(), owner.to_string(), now.to_rfc3339()),
        )?;
        tx.commit()?;

        Ok(Board {
            id,
            title: input.title,
            description: input.description,
            owner,
            members: vec![owner],
            background_color,
            is_archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_board(&self, id: Uuid, input: UpdateBoardInput) -> Result<Option<Board>> {
        let conn = self.conn()?;
        let Some(existing) = query_board(&conn, id)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let description = input.description.unwrap_or(existing.description);
        let background_color = input.background_color.unwrap_or(existing.background_color);
        let is_archived = input.is_archived.unwrap_or(existing.is_archived);

        conn.execute(
            "UPDATE boards SET title = ?, description = ?, background_color = ?, is_archived = ?,
             updated_at = ? WHERE id = ?",
            (
                &title,
                &description,
                &background_color,
                is_archived,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Board {
            id,
            title,
            description,
            owner: existing.owner,
            members: existing.members,
            background_color,
            is_archived,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Delete a board together with its activities, tasks, lists, and
    /// memberships, children first, in one transaction.
    pub fn delete_board(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let key = id.to_string();

        let activities = tx.execute("DELETE FROM activities WHERE board_id = ?", [&key])?;
        // Tasks moved in from another board keep their own board_id.
        let tasks = tx.execute(
            "DELETE FROM tasks
             WHERE board_id = ?1 OR list_id IN (SELECT id FROM lists WHERE board_id = ?1)",
            [&key],
        )?;
        let lists = tx.execute("DELETE FROM lists WHERE board_id = ?", [&key])?;
        tx.execute("DELETE FROM board_members WHERE board_id = ?", [&key])?;
        let rows = tx.execute("DELETE FROM boards WHERE id = ?", [&key])?;
        tx.commit()?;

        if rows > 0 {
            tracing::debug!(
                board_id = %id,
                lists,
                tasks,
                activities,
                "Board deleted with children"
            );
        }
        Ok(rows > 0)
    }

    /// Add a member. Returns `false` when the user already was one.
    pub fn add_board_member(&self, board_id: Uuid, user_id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let now = Utc::now();
        let rows = conn.execute(
            "INSERT OR IGNORE INTO board_members (board_id, user_id, added_at) VALUES (?, ?, ?)",
            (board_id.to_string(), user_id.to_string(), now.to_rfc3339()),
        )?;
        if rows > 0 {
            conn.execute(
                "UPDATE boards SET updated_at = ? WHERE id = ?",
                (now.to_rfc3339(), board_id.to_string()),
            )?;
        }
        Ok(rows > 0)
    }

    // ============================================================
    // List operations
    // ============================================================

    /// Non-archived lists of a board in display order.
    pub fn get_lists_by_board(&self, board_id: Uuid) -> Result<Vec<List>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LIST_COLUMNS} FROM lists
             WHERE board_id = ? AND is_archived = 0 ORDER BY position, rowid"
        ))?;

        let lists = stmt
            .query_map([board_id.to_string()], list_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lists)
    }

    pub fn get_list(&self, id: Uuid) -> Result<Option<List>> {
        let conn = self.conn()?;
        let list = conn
            .query_row(
                &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?"),
                [id.to_string()],
                list_from_row,
            )
            .optional()?;
        Ok(list)
    }

    /// Append a list to a board. Archived lists count towards the maximum
    /// position.
    pub fn create_list(
        &self,
        board_id: Uuid,
        input: CreateListInput,
        positioner: &dyn Positioner,
    ) -> Result<List> {
        let conn = self.conn()?;
        let max: Option<i64> = conn.query_row(
            "SELECT MAX(position) FROM lists WHERE board_id = ?",
            [board_id.to_string()],
            |row| row.get(0),
        )?;
        let position = positioner.append(max);
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO lists (id, title, board_id, position, is_archived, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
            (
                id.to_string(),
                &input.title,
                board_id.to_string(),
                position,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(List {
            id,
            title: input.title,
            board_id,
            position,
            is_archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_list(&self, id: Uuid, input: UpdateListInput) -> Result<Option<List>> {
        let Some(existing) = self.get_list(id)? else {
            return Ok(None);
        };

        let conn = self.conn()?;
        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let position = input.position.unwrap_or(existing.position);
        let is_archived = input.is_archived.unwrap_or(existing.is_archived);

        conn.execute(
            "UPDATE lists SET title = ?, position = ?, is_archived = ?, updated_at = ?
             WHERE id = ?",
            (&title, position, is_archived, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Some(List {
            id,
            title,
            board_id: existing.board_id,
            position,
            is_archived,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Delete a list and every task in it. Sibling lists keep their positions.
    pub fn delete_list(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tasks WHERE list_id = ?", [id.to_string()])?;
        let rows = tx.execute("DELETE FROM lists WHERE id = ?", [id.to_string()])?;
        tx.commit()?;
        Ok(rows > 0)
    }

    // ============================================================
    // Task operations
    // ============================================================

    /// Non-archived tasks of a list in display order, optionally filtered by a
    /// case-insensitive title substring.
    pub fn get_tasks_by_list(
        &self,
        list_id: Uuid,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Page<Task>> {
        let conn = self.conn()?;
        let filter = "list_id = ?1 AND is_archived = 0
             AND (?2 IS NULL OR lower(title) LIKE ?2 ESCAPE '\\')";
        let pattern = search.filter(|s| !s.is_empty()).map(like_pattern);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks WHERE {filter}"),
            params![list_id.to_string(), pattern],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE {filter}
             ORDER BY position, rowid LIMIT ?3 OFFSET ?4"
        ))?;
        let tasks = stmt
            .query_map(
                params![list_id.to_string(), pattern, limit, page_offset(page, limit)],
                task_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items: tasks,
            total: total.max(0) as u64,
        })
    }

    /// Non-archived tasks of a board, newest first.
    pub fn get_tasks_by_board(&self, board_id: Uuid) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE board_id = ? AND is_archived = 0 ORDER BY created_at DESC, rowid DESC"
        ))?;

        let tasks = stmt
            .query_map([board_id.to_string()], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.conn()?;
        query_task(&conn, id)
    }

    /// Append a task to `list`. The task inherits the list's board.
    pub fn create_task(
        &self,
        list: &List,
        created_by: Uuid,
        input: CreateTaskInput,
        positioner: &dyn Positioner,
    ) -> Result<Task> {
        let conn = self.conn()?;
        let max: Option<i64> = conn.query_row(
            "SELECT MAX(position) FROM tasks WHERE list_id = ?",
            [list.id.to_string()],
            |row| row.get(0),
        )?;
        let position = positioner.append(max);
        let id = Uuid::new_v4();
        let now = Utc::now();
        let priority = input.priority.unwrap_or_default();

        conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?12, ?12)"
            ),
            params![
                id.to_string(),
                &input.title,
                &input.description,
                list.id.to_string(),
                list.board_id.to_string(),
                serde_json::to_string(&input.assigned_to)?,
                position,
                priority.as_str(),
                input.due_date.map(|d| d.to_rfc3339()),
                serde_json::to_string(&input.labels)?,
                created_by.to_string(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Task {
            id,
            title: input.title,
            description: input.description,
            list_id: list.id,
            board_id: list.board_id,
            assigned_to: input.assigned_to,
            position,
            priority,
            due_date: input.due_date,
            labels: input.labels,
            is_archived: false,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_task(&self, id: Uuid, input: UpdateTaskInput) -> Result<Option<Task>> {
        let conn = self.conn()?;
        let Some(existing) = query_task(&conn, id)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let task = Task {
            title: input.title.unwrap_or(existing.title),
            description: input.description.unwrap_or(existing.description),
            assigned_to: input.assigned_to.unwrap_or(existing.assigned_to),
            priority: input.priority.unwrap_or(existing.priority),
            due_date: input.due_date.unwrap_or(existing.due_date),
            labels: input.labels.unwrap_or(existing.labels),
            is_archived: input.is_archived.unwrap_or(existing.is_archived),
            updated_at: now,
            ..existing
        };

        conn.execute(
            "UPDATE tasks SET title = ?, description = ?, assigned_to = ?, priority = ?,
             due_date = ?, labels = ?, is_archived = ?, updated_at = ? WHERE id = ?",
            params![
                &task.title,
                &task.description,
                serde_json::to_string(&task.assigned_to)?,
                task.priority.as_str(),
                task.due_date.map(|d| d.to_rfc3339()),
                serde_json::to_string(&task.labels)?,
                task.is_archived,
                now.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(task))
    }

    /// Relocate a task to `target_list_id` at `target_position`.
    ///
    /// The positioner decides which rows change; every write happens in one
    /// transaction so a task is never left reassigned without the sibling
    /// updates. Returns `None` if the task does not exist. The target list is
    /// expected to exist already.
    pub fn move_task(
        &self,
        id: Uuid,
        target_list_id: Uuid,
        target_position: i64,
        positioner: &dyn Positioner,
    ) -> Result<Option<MovedTask>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let Some(task) = query_task(&tx, id)? else {
            return Ok(None);
        };
        let from_list_id = task.list_id;

        let source = query_slots(&tx, from_list_id)?;
        let target = if from_list_id == target_list_id {
            source.clone()
        } else {
            query_slots(&tx, target_list_id)?
        };

        let plan = positioner.plan_move(&MoveRequest {
            item: Slot::new(task.id, task.position),
            source_id: from_list_id,
            target_id: target_list_id,
            target_position,
            source: &source,
            target: &target,
        });

        let now = Utc::now();
        for update in &plan.updates {
            if update.id == id {
                tx.execute(
                    "UPDATE tasks SET list_id = ?, position = ?, updated_at = ? WHERE id = ?",
                    (
                        update.container_id.to_string(),
                        update.position,
                        now.to_rfc3339(),
                        id.to_string(),
                    ),
                )?;
            } else {
                tx.execute(
                    "UPDATE tasks SET position = ? WHERE id = ?",
                    (update.position, update.id.to_string()),
                )?;
            }
        }

        let task = query_task(&tx, id)?
            .ok_or_else(|| anyhow::anyhow!("Task {id} vanished during move"))?;
        tx.commit()?;

        tracing::debug!(
            task_id = %id,
            from = %from_list_id,
            to = %target_list_id,
            position = task.position,
            writes = plan.updates.len(),
            positioner = %positioner.kind(),
            "Task moved"
        );

        Ok(Some(MovedTask { task, from_list_id }))
    }

    /// Delete a single task. Siblings keep their positions.
    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Activity operations
    // ============================================================

    pub fn record_activity(&self, input: NewActivity) -> Result<Activity> {
        let conn = self.conn()?;
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            &format!("INSERT INTO activities ({ACTIVITY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"),
            (
                id.to_string(),
                input.board_id.to_string(),
                input.user_id.to_string(),
                input.action.as_str(),
                input.target_type.as_str(),
                input.target_id.to_string(),
                serde_json::to_string(&input.details)?,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Activity {
            id,
            board_id: input.board_id,
            user_id: input.user_id,
            action: input.action,
            target_type: input.target_type,
            target_id: input.target_id,
            details: input.details,
            created_at: now,
        })
    }

    /// Activities of a board, newest first.
    pub fn get_activities_by_board(
        &self,
        board_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Page<Activity>> {
        let conn = self.conn()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE board_id = ?",
            [board_id.to_string()],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE board_id = ?
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        ))?;
        let activities = stmt
            .query_map(
                params![board_id.to_string(), limit, page_offset(page, limit)],
                activity_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items: activities,
            total: total.max(0) as u64,
        })
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "taskboard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("taskboard.db"))
}

fn query_board(conn: &Connection, id: Uuid) -> Result<Option<Board>> {
    let board = conn
        .query_row(
            &format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?"),
            [id.to_string()],
            board_from_row,
        )
        .optional()?;

    match board {
        Some(mut board) => {
            board.members = query_members(conn, id)?;
            Ok(Some(board))
        }
        None => Ok(None),
    }
}

fn query_members(conn: &Connection, board_id: Uuid) -> Result<Vec<Uuid>> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM board_members WHERE board_id = ? ORDER BY added_at, rowid",
    )?;
    let members = stmt
        .query_map([board_id.to_string()], |row| {
            Ok(parse_uuid(row.get::<_, String>(0)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

fn query_task(conn: &Connection, id: Uuid) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"),
            [id.to_string()],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

/// Every task of a list, archived ones included, in display order.
fn query_slots(conn: &Connection, list_id: Uuid) -> Result<Vec<Slot>> {
    let mut stmt =
        conn.prepare("SELECT id, position FROM tasks WHERE list_id = ? ORDER BY position, rowid")?;
    let slots = stmt
        .query_map([list_id.to_string()], |row| {
            Ok(Slot::new(parse_uuid(row.get(0)?), row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(slots)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        avatar: row.get(3)?,
        created_at: parse_datetime(row.get(4)?),
    })
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: parse_uuid(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        owner: parse_uuid(row.get(3)?),
        members: Vec::new(),
        background_color: row.get(4)?,
        is_archived: row.get(5)?,
        created_at: parse_datetime(row.get(6)?),
        updated_at: parse_datetime(row.get(7)?),
    })
}

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: parse_uuid(row.get(0)?),
        title: row.get(1)?,
        board_id: parse_uuid(row.get(2)?),
        position: row.get(3)?,
        is_archived: row.get(4)?,
        created_at: parse_datetime(row.get(5)?),
        updated_at: parse_datetime(row.get(6)?),
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_uuid(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        list_id: parse_uuid(row.get(3)?),
        board_id: parse_uuid(row.get(4)?),
        assigned_to: serde_json::from_str(&row.get::<_, String>(5)?).unwrap_or_default(),
        position: row.get(6)?,
        priority: Priority::from_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        due_date: row.get::<_, Option<String>>(8)?.map(parse_datetime),
        labels: serde_json::from_str(&row.get::<_, String>(9)?).unwrap_or_default(),
        is_archived: row.get(10)?,
        created_by: parse_uuid(row.get(11)?),
        created_at: parse_datetime(row.get(12)?),
        updated_at: parse_datetime(row.get(13)?),
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    let details = row
        .get::<_, Option<String>>(6)?
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null);

    Ok(Activity {
        id: parse_uuid(row.get(0)?),
        board_id: parse_uuid(row.get(1)?),
        user_id: parse_uuid(row.get(2)?),
        action: ActivityAction::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(ActivityAction::UpdateBoard),
        target_type: TargetType::from_str(&row.get::<_, String>(4)?).unwrap_or(TargetType::Board),
        target_id: parse_uuid(row.get(5)?),
        details,
        created_at: parse_datetime(row.get(7)?),
    })
}

/// Lowercased `%term%` pattern with LIKE wildcards escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(limit)
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
