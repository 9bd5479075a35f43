use crate::event::InboxEvent;
use crate::publisher::Publisher;
use crate::Config;
use argus_core::display_name;
use argus_engine::{AgentSpawn, SessionStart, Store, StoreConfig};
use argus_providers::extract::{
    current_activity, current_todos, initial_task, is_planning, last_user_message,
    pending_question, rate_limit, server_running, system_error,
};
use argus_providers::{now_secs, parse_transcript, scan_claude_root, scan_openclaw_root, DiscoveredSession, Flavor};
use argus_types::{now_ms, AgentType, Modes};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Drives the two poll loops and the external event inbox, applying every
/// transition to a `Store` it owns exclusively as the graph's single writer.
/// Whenever a reconcile pass or inbox event reports `changed`, a fresh snapshot is
/// handed to the publisher.
pub struct Scheduler {
    store: Store,
    config: Config,
    inbox: mpsc::Receiver<InboxEvent>,
    publisher: Publisher,
}

impl Scheduler {
    pub fn new(config: Config, inbox: mpsc::Receiver<InboxEvent>) -> (Self, Publisher) {
        let store_config = StoreConfig {
            idle_timeout_ms: config.idle_timeout_secs as i64 * 1000,
            stale_project_ttl_ms: config.stale_project_ttl_secs as i64 * 1000,
            stale_blocked_main_ttl_ms: config.stale_blocked_main_ttl_secs as i64 * 1000,
            completed_work_capacity: config.completed_work_capacity,
            completed_work_ttl_ms: config.completed_work_ttl_secs as i64 * 1000,
        };
        let store = Store::with_config(store_config);
        let publisher = Publisher::new(store.snapshot(now_ms()));
        let scheduler = Self {
            store,
            config,
            inbox,
            publisher: publisher.clone(),
        };
        (scheduler, publisher)
    }

    /// Runs until the inbox is closed (i.e. every sender, including the ingress
    /// surface's, has been dropped) — the cooperative shutdown path.
    pub async fn run(mut self) {
        let mut full_reconcile = tokio::time::interval(Duration::from_secs(
            self.config.full_reconcile_interval_secs,
        ));
        let mut fast_activity = tokio::time::interval(Duration::from_secs(
            self.config.fast_activity_interval_secs,
        ));
        let mut cleanup_tick = tokio::time::interval(Duration::from_secs(5 * 60));

        loop {
            tokio::select! {
                _ = full_reconcile.tick() => {
                    let changed = self.run_full_reconcile();
                    if changed {
                        self.publish();
                    }
                }
                _ = fast_activity.tick() => {
                    let changed = self.run_fast_activity();
                    if changed {
                        self.publish();
                    }
                }
                _ = cleanup_tick.tick() => {
                    let changed = self.store.cleanup(now_ms());
                    if changed {
                        self.publish();
                    }
                }
                event = self.inbox.recv() => {
                    match event {
                        Some(event) => {
                            let changed = self.apply_inbox_event(event);
                            if changed {
                                self.publish();
                            }
                        }
                        None => {
                            debug!("scheduler inbox closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn publish(&self) {
        self.publisher.publish(self.store.snapshot(now_ms()));
    }

    /// Full reconcile (~5 s): discover every active transcript, register any
    /// session not yet known as the project's `main` agent, run all extractors over
    /// it, and resolve the blocking condition in priority order.
    fn run_full_reconcile(&mut self) -> bool {
        let now_s = now_secs();
        let mut changed = false;

        if let Ok(root) = self.config.claude_root() {
            match scan_claude_root(&root, now_s, self.config.claude_active_threshold_secs) {
                Ok(sessions) => {
                    for session in sessions {
                        changed |= self.reconcile_session(&session);
                    }
                }
                Err(err) => warn!(%err, "claude discovery scan failed"),
            }
        }

        if let Ok(root) = self.config.openclaw_root() {
            match scan_openclaw_root(&root, now_s, self.config.openclaw_active_threshold_secs) {
                Ok(sessions) => {
                    for session in sessions {
                        changed |= self.reconcile_session(&session);
                    }
                }
                Err(err) => warn!(%err, "openclaw discovery scan failed"),
            }
        }

        changed
    }

    fn reconcile_session(&mut self, session: &DiscoveredSession) -> bool {
        let now = now_ms();
        let entries = match parse_transcript(&session.transcript_path) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %session.transcript_path.display(), %err, "transcript unreadable, skipping this pass");
                return false;
            }
        };

        let mut changed = false;
        let project_name = match session.flavor {
            Flavor::OpenClaw => session
                .agent_label
                .clone()
                .unwrap_or_else(|| display_name(&session.project_path)),
            Flavor::Claude => display_name(&session.project_path),
        };

        let is_new_session = self
            .store
            .projects()
            .get(&argus_core::project_id_from_root(&session.project_path))
            .and_then(|p| p.main_agent_id())
            .map(|id| id.as_str() != session.session_id.as_str())
            .unwrap_or(true);

        if is_new_session {
            changed |= self.store.on_session_start(
                SessionStart {
                    session_id: session.session_id.clone(),
                    path: session.project_path.clone(),
                    name: project_name,
                    task: initial_task(&entries),
                    modes: None,
                    transcript_path: Some(session.transcript_path.to_string_lossy().into_owned()),
                },
                now,
            );
        }

        changed |= self.apply_extractors(&session.session_id, &session.project_path, &entries, now);
        changed
    }

    /// Fast activity check (~3 s): restricted to `working` agents with a
    /// known transcript, updating only `currentActivity` and `todos`.
    fn run_fast_activity(&mut self) -> bool {
        let now = now_ms();
        let mut changed = false;
        for (session_id, project_path, transcript_path) in
            self.store.working_sessions_with_transcripts()
        {
            let entries = match parse_transcript(Path::new(&transcript_path)) {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(path = %transcript_path, %err, "transcript unreadable during fast activity check");
                    continue;
                }
            };
            changed |= self.store.update_current_activity(
                &session_id,
                &project_path,
                current_activity(&entries).as_deref(),
                now,
            );
            changed |= self
                .store
                .update_agent_todos(&session_id, &project_path, current_todos(&entries), now);
        }
        changed
    }

    /// Applies modes/activity/todos/last-user-message/task, then the blocking
    /// priority `(pendingQuestion > systemError > rateLimit > serverRunning >
    /// otherwise unblock)`.
    fn apply_extractors(
        &mut self,
        session_id: &str,
        project_path: &str,
        entries: &[argus_types::Entry],
        now: argus_types::TimestampMs,
    ) -> bool {
        let mut changed = false;

        let modes = Modes {
            planning: is_planning(entries),
            ..Default::default()
        };
        changed |= self
            .store
            .update_agent_modes(session_id, project_path, modes, now);

        let activity = current_activity(entries);
        changed |= self.store.update_current_activity(
            session_id,
            project_path,
            activity.as_deref(),
            now,
        );

        let todos = current_todos(entries);
        changed |= self
            .store
            .update_agent_todos(session_id, project_path, todos, now);

        if let Some(message) = last_user_message(entries) {
            changed |= self.store.update_last_user_message(project_path, &message, now);
        }

        if let Some(question) = pending_question(entries) {
            changed |= self
                .store
                .on_agent_blocked(session_id, project_path, &question, activity.as_deref(), now);
        } else if let Some(error) = system_error(entries) {
            changed |= self
                .store
                .on_agent_blocked(session_id, project_path, &error, activity.as_deref(), now);
        } else if let Some(reset_at) = rate_limit(entries, now) {
            changed |= self
                .store
                .on_agent_rate_limited(session_id, project_path, reset_at, now);
        } else if server_running(entries).is_some() {
            changed |= self
                .store
                .on_agent_server_running(session_id, project_path, now);
        } else {
            changed |= self.store.on_agent_unblocked(session_id, project_path, now);
        }

        changed
    }

    /// Dispatches an ingress event with the same transitions a reconcile
    /// pass would use, but without the priority evaluation: the event's own type
    /// has already resolved which condition applies.
    fn apply_inbox_event(&mut self, event: InboxEvent) -> bool {
        let now = now_ms();
        match event {
            InboxEvent::SessionStart {
                session_id,
                project_path,
                project_name,
                task,
            } => self.store.on_session_start(
                SessionStart {
                    session_id,
                    path: project_path,
                    name: project_name,
                    task,
                    modes: None,
                    transcript_path: None,
                },
                now,
            ),
            InboxEvent::SessionEnd { session_id, project_path } => {
                self.store.on_session_end(&session_id, &project_path, now)
            }
            InboxEvent::AgentSpawn {
                parent_session_id,
                project_path,
                project_name,
                agent_id,
                agent_name,
                agent_type,
                task,
                metadata,
            } => {
                let shell_id = if agent_type == AgentType::Background {
                    Some(agent_id.clone())
                } else {
                    None
                };
                let delegating_to = metadata.and_then(|m| m.delegating_to);
                self.store.on_agent_spawn(
                    AgentSpawn {
                        parent_session_id,
                        path: project_path,
                        name: project_name,
                        agent_id,
                        agent_name,
                        task,
                        agent_type,
                        shell_id,
                        delegating_to,
                    },
                    now,
                )
            }
            InboxEvent::AgentBlocked {
                session_id,
                project_path,
                question,
            } => self
                .store
                .on_agent_blocked(&session_id, &project_path, &question, None, now),
            InboxEvent::AgentUnblocked { session_id, project_path } => {
                self.store.on_agent_unblocked(&session_id, &project_path, now)
            }
            InboxEvent::AgentComplete {
                session_id,
                project_path,
                agent_id,
                agent_name,
                task,
            } => {
                let _ = session_id;
                self.store.on_agent_complete(
                    &project_path,
                    agent_id.as_deref(),
                    agent_name.as_deref(),
                    task.as_deref(),
                    now,
                )
            }
            InboxEvent::Activity { session_id, project_path } => {
                self.store.on_activity(&session_id, &project_path, now)
            }
            InboxEvent::BackgroundTaskComplete { shell_id } => {
                self.store.on_background_task_complete(&shell_id, now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventMetadata;
    use argus_types::AgentStatus;

    fn scheduler() -> Scheduler {
        let (_tx, rx) = mpsc::channel(8);
        Scheduler::new(Config::default(), rx).0
    }

    #[test]
    fn inbox_session_start_registers_project_and_main_agent() {
        let mut sched = scheduler();
        assert!(sched.apply_inbox_event(InboxEvent::SessionStart {
            session_id: "s1".into(),
            project_path: "/a/b".into(),
            project_name: "b".into(),
            task: Some("fix the bug".into()),
        }));

        let id = argus_core::project_id_from_root("/a/b");
        let project = sched.store.projects().get(&id).unwrap();
        assert_eq!(project.agents.len(), 1);
    }

    #[test]
    fn inbox_agent_spawn_then_complete_records_completed_work() {
        let mut sched = scheduler();
        sched.apply_inbox_event(InboxEvent::SessionStart {
            session_id: "s1".into(),
            project_path: "/a/b".into(),
            project_name: "b".into(),
            task: None,
        });
        sched.apply_inbox_event(InboxEvent::AgentSpawn {
            parent_session_id: "s1".into(),
            project_path: "/a/b".into(),
            project_name: "b".into(),
            agent_id: "sub1".into(),
            agent_name: Some("helper".into()),
            agent_type: AgentType::Subagent,
            task: Some("refactor".into()),
            metadata: Some(EventMetadata {
                delegating_to: Some("helper".into()),
                ..Default::default()
            }),
        });

        assert!(sched.apply_inbox_event(InboxEvent::AgentComplete {
            session_id: "s1".into(),
            project_path: "/a/b".into(),
            agent_id: Some("sub1".into()),
            agent_name: None,
            task: None,
        }));

        let id = argus_core::project_id_from_root("/a/b");
        let project = sched.store.projects().get(&id).unwrap();
        assert_eq!(
            project.agents.get(&argus_types::AgentId::new("sub1")).unwrap().status,
            AgentStatus::Complete
        );
        assert_eq!(project.agents.get(&argus_types::AgentId::new("sub1")).unwrap().delegating_to, Some("helper".into()));
        assert_eq!(sched.store.snapshot(now_ms()).completed_work.len(), 1);
    }

    #[test]
    fn reconcile_session_reads_transcript_and_sets_initial_task() {
        let dir = tempfile::TempDir::new().unwrap();
        let transcript = dir.path().join("s1.jsonl");
        std::fs::write(
            &transcript,
            "{\"type\":\"user\",\"cwd\":\"/a/b\",\"message\":{\"content\":\"please fix the parser\"}}\n",
        )
        .unwrap();

        let mut sched = scheduler();
        let session = DiscoveredSession {
            session_id: "s1".into(),
            project_path: "/a/b".into(),
            flavor: Flavor::Claude,
            agent_label: None,
            transcript_path: transcript,
        };

        assert!(sched.reconcile_session(&session));
        let id = argus_core::project_id_from_root("/a/b");
        let project = sched.store.projects().get(&id).unwrap();
        let agent = project.agents.get(&argus_types::AgentId::new("s1")).unwrap();
        assert_eq!(agent.task.as_deref(), Some("please fix the parser"));
    }

    #[test]
    fn unknown_inbox_event_for_missing_project_is_a_no_op() {
        let mut sched = scheduler();
        assert!(!sched.apply_inbox_event(InboxEvent::Activity {
            session_id: "ghost".into(),
            project_path: "/never/registered".into(),
        }));
    }
}
