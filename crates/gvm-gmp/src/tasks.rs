// GMP task operations
//
// Creation splits reference parameters (config, target, ...) out of the
// plain parameters: gvmd expects them as `<config id="..."/>` children.
// Lifecycle verbs are single-attribute commands keyed by `task_id`.

use tracing::debug;

use crate::client::GmpClient;
use crate::error::Error;
use crate::models::{Task, created_id, map_all, map_first};
use crate::transport::Socket;
use crate::xml::{Document, Element, Params, params};

/// Parameters of `task_create` that name another entity by id.
pub const TASK_REFERENCES: [&str; 6] = [
    "config",
    "target",
    "escalator",
    "schedule",
    "alert",
    "scanner",
];

impl<S: Socket> GmpClient<S> {
    /// Create a task from plain text `params` and id `references`.
    pub fn task_create_raw(
        &mut self,
        params: &Params,
        references: &Params,
    ) -> Result<String, Error> {
        let element = Element::mixed("create_task", params, "id", references);
        let doc = self.command(&element)?;
        created_id(&doc, &element)
    }

    /// Create a task and return its id.
    ///
    /// Keys listed in [`TASK_REFERENCES`] are sent as `<key id="value"/>`;
    /// everything else (`name`, `comment`, ...) as text children.
    pub fn task_create(&mut self, mut params: Params) -> Result<String, Error> {
        let references: Params = TASK_REFERENCES
            .iter()
            .filter_map(|key| params.shift_remove_entry(*key))
            .collect();
        self.task_create_raw(&params, &references)
    }

    pub fn task_delete(&mut self, id: &str) -> Result<Document, Error> {
        self.task_verb("delete_task", id)
    }

    /// `<get_tasks .../>` with `params` as attributes, unprocessed.
    pub fn task_get_raw(&mut self, params: &Params) -> Result<Document, Error> {
        self.command_with_attributes("get_tasks", params)
    }

    /// All tasks matching `params`, in response order.
    pub fn task_get_all(&mut self, params: &Params) -> Result<Vec<Task>, Error> {
        let doc = self.task_get_raw(params)?;
        map_all(&doc, "get_tasks_response/task")
    }

    /// The task with the given id, or `None` if gvmd returns none.
    pub fn task_get_byid(&mut self, id: &str) -> Result<Option<Task>, Error> {
        let doc = self.task_get_raw(&params([("task_id", id), ("details", "0")]))?;
        map_first(&doc, "get_tasks_response/task")
    }

    /// Whether the task's status is exactly `Done`.
    pub fn task_finished(&mut self, id: &str) -> Result<bool, Error> {
        Ok(self.require_task(id)?.is_done())
    }

    /// The task's progress in percent (-1 when no scan is active).
    pub fn task_progress(&mut self, id: &str) -> Result<i32, Error> {
        Ok(self.require_task(id)?.progress)
    }

    pub fn task_start(&mut self, id: &str) -> Result<Document, Error> {
        self.task_verb("start_task", id)
    }

    pub fn task_stop(&mut self, id: &str) -> Result<Document, Error> {
        self.task_verb("stop_task", id)
    }

    pub fn task_pause(&mut self, id: &str) -> Result<Document, Error> {
        self.task_verb("pause_task", id)
    }

    /// Resume a stopped or paused task, or start it if it never ran.
    pub fn task_resume_or_start(&mut self, id: &str) -> Result<Document, Error> {
        self.task_verb("resume_or_start_task", id)
    }

    fn task_verb(&mut self, verb: &str, id: &str) -> Result<Document, Error> {
        debug!(task_id = id, verb, "task control");
        self.command_with_attributes(verb, &params([("task_id", id)]))
    }

    fn require_task(&mut self, id: &str) -> Result<Task, Error> {
        self.task_get_byid(id)?.ok_or_else(|| Error::NotFound {
            entity: "task",
            id: id.to_owned(),
        })
    }
}
