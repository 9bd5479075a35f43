use crate::status::derive_with_idle_timeout;
use argus_core::{display_name, project_id_from_root};
use argus_types::{
    Agent, AgentId, AgentStatus, AgentType, CompletedWorkItem, Modes, Project, ProjectId,
    ProjectStatus, Snapshot, TimestampMs, TodoList,
};
use std::collections::{BTreeMap, VecDeque};

/// Default stale-project TTL: an idle project untouched this long is garbage collected.
pub const STALE_PROJECT_TTL_MS: TimestampMs = 30 * 60 * 1000;
/// Default stale-blocked-main TTL: a blocked main agent silent this long is dropped.
pub const STALE_BLOCKED_MAIN_TTL_MS: TimestampMs = 5 * 60 * 1000;
/// Default completed-work ring buffer capacity.
pub const COMPLETED_WORK_CAPACITY: usize = 20;
/// Default completed-work TTL.
pub const COMPLETED_WORK_TTL_MS: TimestampMs = 5 * 60 * 1000;
/// Default idle timeout, mirrored from `status::IDLE_TIMEOUT_MS` so the store's
/// own default matches the one `derive_project_status` used before thresholds
/// became configurable.
pub const IDLE_TIMEOUT_MS: TimestampMs = crate::status::IDLE_TIMEOUT_MS;

/// The tunable thresholds the reconciler's cleanup pass and status derivation
/// use. Defaults mirror the constants above; a caller wanting operator-chosen
/// values (from `argus-runtime::Config`) builds one with [`Store::with_config`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub idle_timeout_ms: TimestampMs,
    pub stale_project_ttl_ms: TimestampMs,
    pub stale_blocked_main_ttl_ms: TimestampMs,
    pub completed_work_capacity: usize,
    pub completed_work_ttl_ms: TimestampMs,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: IDLE_TIMEOUT_MS,
            stale_project_ttl_ms: STALE_PROJECT_TTL_MS,
            stale_blocked_main_ttl_ms: STALE_BLOCKED_MAIN_TTL_MS,
            completed_work_capacity: COMPLETED_WORK_CAPACITY,
            completed_work_ttl_ms: COMPLETED_WORK_TTL_MS,
        }
    }
}

/// Parameters for [`Store::on_session_start`].
#[derive(Debug, Clone, Default)]
pub struct SessionStart {
    pub session_id: String,
    pub path: String,
    pub name: String,
    pub task: Option<String>,
    pub modes: Option<Modes>,
    pub transcript_path: Option<String>,
}

/// Parameters for [`Store::on_agent_spawn`].
#[derive(Debug, Clone, Default)]
pub struct AgentSpawn {
    pub parent_session_id: String,
    pub path: String,
    pub name: String,
    pub agent_id: String,
    pub agent_name: Option<String>,
    pub task: Option<String>,
    pub agent_type: AgentType,
    pub shell_id: Option<String>,
    pub delegating_to: Option<String>,
}

/// Canonical in-memory graph of projects → agents. All mutation paths are
/// exposed as named transitions returning whether the observable snapshot changed;
/// the scheduler is the sole caller and decides whether to publish from that bool.
#[derive(Debug, Default)]
pub struct Store {
    projects: BTreeMap<ProjectId, Project>,
    completed_work: VecDeque<CompletedWorkItem>,
    config: StoreConfig,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store whose cleanup/status thresholds come from the operator's
    /// configuration rather than the built-in defaults.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            projects: BTreeMap::new(),
            completed_work: VecDeque::new(),
            config,
        }
    }

    pub fn projects(&self) -> &BTreeMap<ProjectId, Project> {
        &self.projects
    }

    /// `(sessionId, projectPath, transcriptPath)` for every `working` agent with a
    /// known transcript — the fast-activity check's restricted scan set.
    pub fn working_sessions_with_transcripts(&self) -> Vec<(String, String, String)> {
        self.projects
            .values()
            .flat_map(|project| {
                project.agents.values().filter_map(|agent| {
                    if agent.status == AgentStatus::Working {
                        agent
                            .transcript_path
                            .as_ref()
                            .map(|t| (agent.id.as_str().to_string(), project.path.clone(), t.clone()))
                    } else {
                        None
                    }
                })
            })
            .collect()
    }

    pub fn snapshot(&self, now: TimestampMs) -> Snapshot {
        let projects = self
            .projects
            .iter()
            .map(|(id, project)| (id.clone(), argus_types::ProjectView::from_project(project, now)))
            .collect();
        Snapshot {
            projects,
            completed_work: self.completed_work.iter().cloned().collect(),
            last_updated: now,
        }
    }

    fn ensure_project(&mut self, path: &str, name: &str, now: TimestampMs) -> ProjectId {
        let id = project_id_from_root(path);
        self.projects.entry(id.clone()).or_insert_with(|| {
            let display = if name.is_empty() { display_name(path) } else { name.to_string() };
            Project::new(id.clone(), path.to_string(), display, now)
        });
        id
    }

    fn recompute_status(&mut self, project_id: &ProjectId, now: TimestampMs) {
        if let Some(project) = self.projects.get_mut(project_id) {
            let new_status = derive_with_idle_timeout(project, now, self.config.idle_timeout_ms);
            if new_status != ProjectStatus::Blocked && project.status == ProjectStatus::Blocked {
                project.blocked_since = None;
            }
            if new_status == ProjectStatus::Blocked && project.status != ProjectStatus::Blocked {
                project.blocked_since = Some(now);
            }
            project.status = new_status;
        }
    }

    /// I1: creates the project if absent, drops any other `main` agent in it, installs
    /// a fresh `main` agent in `working`.
    pub fn on_session_start(&mut self, params: SessionStart, now: TimestampMs) -> bool {
        let project_id = self.ensure_project(&params.path, &params.name, now);
        let project = self.projects.get_mut(&project_id).expect("just ensured");

        project.agents.retain(|_, a| a.agent_type != AgentType::Main);
        clear_dangling_parent_links(project);

        let mut agent = Agent::new_main(AgentId::new(params.session_id), now);
        agent.task = params.task;
        agent.modes = params.modes;
        agent.transcript_path = params.transcript_path;
        project.agents.insert(agent.id.clone(), agent);
        project.last_activity_at = now;

        self.recompute_status(&project_id, now);
        true
    }

    pub fn on_session_end(&mut self, session_id: &str, path: &str, now: TimestampMs) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, now| {
            if agent.status == AgentStatus::Complete {
                return false;
            }
            agent.status = AgentStatus::Complete;
            agent.last_activity_at = now;
            true
        })
    }

    /// Adds a `subagent`/`background` agent under `parent_session_id`; for
    /// `background`, remembers `agentId → shellId` for a later
    /// `backgroundTaskComplete(shellId)` to resolve.
    ///
    /// A spawn event can race ahead of its own parent's `session_start` (the
    /// parent's hook fires first but the event arrives second), so the declared
    /// parent is not always present yet. When it isn't, fall back to the
    /// project's main agent, the same fallback `on_agent_complete` uses when its
    /// named lookup misses; if there's no main agent either, the child is
    /// parentless rather than pointing at an agent that doesn't exist.
    pub fn on_agent_spawn(&mut self, params: AgentSpawn, now: TimestampMs) -> bool {
        let project_id = self.ensure_project(&params.path, &params.name, now);
        let project = self.projects.get_mut(&project_id).expect("just ensured");

        let parent_id = AgentId::new(params.parent_session_id.clone());
        let parent_id = if project.agents.contains_key(&parent_id) {
            Some(parent_id)
        } else {
            project.main_agent_id().cloned()
        };

        let mut agent = Agent::new_main(AgentId::new(params.agent_id), now);
        agent.agent_type = params.agent_type;
        agent.parent_id = parent_id;
        agent.name = params.agent_name;
        agent.task = params.task;
        agent.shell_id = params.shell_id;
        agent.delegating_to = params.delegating_to;
        project.agents.insert(agent.id.clone(), agent);
        project.last_activity_at = now;

        self.recompute_status(&project_id, now);
        true
    }

    pub fn on_agent_blocked(
        &mut self,
        session_id: &str,
        path: &str,
        question: &str,
        current_activity: Option<&str>,
        now: TimestampMs,
    ) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, now| {
            let changed = agent.status != AgentStatus::Blocked || agent.question.as_deref() != Some(question);
            agent.status = AgentStatus::Blocked;
            agent.question = Some(question.to_string());
            if let Some(activity) = current_activity {
                agent.current_activity = Some(activity.to_string());
            }
            agent.last_activity_at = now;
            changed
        })
    }

    /// Unblocks exactly the referenced agent; other blocked agents in the project
    /// are left untouched. Also the reverse edge for `rate_limited`/`server_running`:
    /// both conditions clear the same way, once the next poll observes them gone.
    pub fn on_agent_unblocked(&mut self, session_id: &str, path: &str, now: TimestampMs) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, now| {
            let changed = matches!(
                agent.status,
                AgentStatus::Blocked | AgentStatus::RateLimited | AgentStatus::ServerRunning
            );
            if !changed {
                return false;
            }
            agent.status = AgentStatus::Working;
            agent.question = None;
            agent.rate_limit_reset_at = None;
            agent.last_activity_at = now;
            true
        })
    }

    /// Lookup order: (a) by `agent_id` if given, (b) else the most-recently-spawned
    /// `subagent` named `agent_name` still `working`, (c) else the project's main agent.
    pub fn on_agent_complete(
        &mut self,
        path: &str,
        agent_id: Option<&str>,
        agent_name: Option<&str>,
        task: Option<&str>,
        now: TimestampMs,
    ) -> bool {
        let project_id = project_id_from_root(path);
        let Some(project) = self.projects.get_mut(&project_id) else {
            return false;
        };

        let resolved_id = agent_id
            .map(AgentId::new)
            .filter(|id| project.agents.contains_key(id))
            .or_else(|| {
                agent_name.and_then(|name| {
                    project
                        .agents
                        .values()
                        .filter(|a| {
                            a.agent_type == AgentType::Subagent
                                && a.status == AgentStatus::Working
                                && a.name.as_deref() == Some(name)
                        })
                        .max_by_key(|a| a.spawned_at)
                        .map(|a| a.id.clone())
                })
            })
            .or_else(|| project.main_agent_id().cloned());

        let Some(resolved_id) = resolved_id else {
            return false;
        };

        let Some(agent) = project.agents.get_mut(&resolved_id) else {
            return false;
        };
        if agent.status == AgentStatus::Complete {
            return false;
        }

        let is_main = agent.agent_type == AgentType::Main;
        agent.status = AgentStatus::Complete;
        agent.last_activity_at = now;
        if let Some(task) = task {
            agent.task = Some(task.to_string());
        }

        if !is_main {
            let item = CompletedWorkItem {
                id: format!("{}-{now}", resolved_id.as_str()),
                agent_name: agent.name.clone().unwrap_or_else(|| resolved_id.as_str().to_string()),
                task: agent.task.clone().unwrap_or_default(),
                completed_at: now,
                project_id: project_id.clone(),
                project_name: project.name.clone(),
            };
            self.push_completed_work(item);
        }

        self.recompute_status(&project_id, now);
        true
    }

    pub fn on_agent_rate_limited(
        &mut self,
        session_id: &str,
        path: &str,
        reset_at: TimestampMs,
        now: TimestampMs,
    ) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, now| {
            let changed = agent.status != AgentStatus::RateLimited || agent.rate_limit_reset_at != Some(reset_at);
            agent.status = AgentStatus::RateLimited;
            agent.rate_limit_reset_at = Some(reset_at);
            agent.last_activity_at = now;
            changed
        })
    }

    pub fn on_agent_server_running(&mut self, session_id: &str, path: &str, now: TimestampMs) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, now| {
            let changed = agent.status != AgentStatus::ServerRunning;
            agent.status = AgentStatus::ServerRunning;
            agent.last_activity_at = now;
            changed
        })
    }

    pub fn on_activity(&mut self, session_id: &str, path: &str, now: TimestampMs) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, now| {
            agent.last_activity_at = now;
            true
        })
    }

    /// Updates `lastActivityAt` only when the activity string actually changes,
    /// so idle detection still works while this is being called on a timer.
    pub fn update_current_activity(
        &mut self,
        session_id: &str,
        path: &str,
        activity: Option<&str>,
        now: TimestampMs,
    ) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, now| {
            let changed = agent.current_activity.as_deref() != activity;
            agent.current_activity = activity.map(str::to_string);
            if changed {
                agent.last_activity_at = now;
            }
            changed
        })
    }

    pub fn update_agent_todos(&mut self, session_id: &str, path: &str, todos: Option<TodoList>, now: TimestampMs) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, _now| {
            let changed = agent.todos != todos;
            agent.todos = todos;
            changed
        })
    }

    pub fn update_agent_modes(&mut self, session_id: &str, path: &str, modes: Modes, now: TimestampMs) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, _now| {
            let changed = agent.modes != Some(modes);
            agent.modes = Some(modes);
            changed
        })
    }

    pub fn update_last_user_message(&mut self, path: &str, message: &str, now: TimestampMs) -> bool {
        let project_id = project_id_from_root(path);
        let Some(project) = self.projects.get_mut(&project_id) else {
            return false;
        };
        let changed = project.last_user_message.as_deref() != Some(message);
        project.last_user_message = Some(message.to_string());
        if changed {
            project.last_activity_at = now;
        }
        changed
    }

    pub fn update_session_task(&mut self, session_id: &str, path: &str, task: &str, now: TimestampMs) -> bool {
        self.with_agent_by_id(path, session_id, now, |agent, _now| {
            let changed = agent.task.as_deref() != Some(task);
            agent.task = Some(task.to_string());
            changed
        })
    }

    /// Resolves a `background` agent by its recorded shell id, for
    /// `backgroundTaskComplete(shellId)` events.
    pub fn on_background_task_complete(&mut self, shell_id: &str, now: TimestampMs) -> bool {
        let Some((project_id, agent_id)) = self.projects.iter().find_map(|(pid, project)| {
            project
                .agents
                .values()
                .find(|a| a.shell_id.as_deref() == Some(shell_id))
                .map(|a| (pid.clone(), a.id.clone()))
        }) else {
            return false;
        };

        let Some(project) = self.projects.get_mut(&project_id) else {
            return false;
        };
        let Some(agent) = project.agents.get_mut(&agent_id) else {
            return false;
        };
        if agent.status == AgentStatus::Complete {
            return false;
        }
        agent.status = AgentStatus::Complete;
        agent.last_activity_at = now;
        let item = CompletedWorkItem {
            id: format!("{}-{now}", agent_id.as_str()),
            agent_name: agent.name.clone().unwrap_or_else(|| agent_id.as_str().to_string()),
            task: agent.task.clone().unwrap_or_default(),
            completed_at: now,
            project_id: project_id.clone(),
            project_name: project.name.clone(),
        };
        self.push_completed_work(item);
        self.recompute_status(&project_id, now);
        true
    }

    fn push_completed_work(&mut self, item: CompletedWorkItem) {
        self.completed_work.push_back(item);
        while self.completed_work.len() > self.config.completed_work_capacity {
            self.completed_work.pop_front();
        }
    }

    /// Stale / cleanup pass (every ~5 min): idle projects untouched for
    /// `stale_project_ttl_ms` are removed; a blocked main agent untouched for
    /// `stale_blocked_main_ttl_ms` is dropped; completed-work entries older than
    /// `completed_work_ttl_ms` are expired. Removing a main agent can leave its
    /// children pointing at a `parentId` that no longer resolves (I4), so any
    /// dangling links are cleared in the same pass.
    pub fn cleanup(&mut self, now: TimestampMs) -> bool {
        let mut changed = false;

        let before = self.completed_work.len();
        self.completed_work
            .retain(|item| now - item.completed_at < self.config.completed_work_ttl_ms);
        changed |= self.completed_work.len() != before;

        let mut stale_projects = Vec::new();
        for (id, project) in self.projects.iter_mut() {
            let stale_blocked_main: Vec<AgentId> = project
                .agents
                .values()
                .filter(|a| {
                    a.agent_type == AgentType::Main
                        && a.status == AgentStatus::Blocked
                        && now - a.last_activity_at >= self.config.stale_blocked_main_ttl_ms
                })
                .map(|a| a.id.clone())
                .collect();
            for agent_id in stale_blocked_main {
                project.agents.remove(&agent_id);
                changed = true;
            }

            if clear_dangling_parent_links(project) {
                changed = true;
            }

            if project.status == ProjectStatus::Idle
                && now - project.last_activity_at >= self.config.stale_project_ttl_ms
            {
                stale_projects.push(id.clone());
            }
        }

        for id in &stale_projects {
            self.projects.remove(id);
            changed = true;
        }

        for id in self.projects.keys().cloned().collect::<Vec<_>>() {
            self.recompute_status(&id, now);
        }

        changed
    }

    fn with_agent_by_id(
        &mut self,
        path: &str,
        session_id: &str,
        now: TimestampMs,
        f: impl FnOnce(&mut Agent, TimestampMs) -> bool,
    ) -> bool {
        let project_id = project_id_from_root(path);
        let Some(project) = self.projects.get_mut(&project_id) else {
            return false;
        };
        let agent_id = AgentId::new(session_id);
        let Some(agent) = project.agents.get_mut(&agent_id) else {
            return false;
        };
        let changed = f(agent, now);
        if changed {
            project.last_activity_at = now;
        }
        self.recompute_status(&project_id, now);
        changed
    }
}

/// Nulls `parentId` on any agent whose parent is no longer in `project.agents`.
/// Keeps I4 ("parentId is either null or refers to an existing agent in the
/// same project") holding after an agent is removed out from under its children.
fn clear_dangling_parent_links(project: &mut Project) -> bool {
    let dangling: Vec<AgentId> = project
        .agents
        .values()
        .filter(|a| {
            a.parent_id
                .as_ref()
                .is_some_and(|parent| !project.agents.contains_key(parent))
        })
        .map(|a| a.id.clone())
        .collect();
    for id in &dangling {
        if let Some(agent) = project.agents.get_mut(id) {
            agent.parent_id = None;
        }
    }
    !dangling.is_empty()
}
