use argus_types::{Agent, AgentStatus, Project, ProjectStatus, TimestampMs};

/// Default idle timeout: a `working` agent counts toward project `working`
/// status only while it has been active within this window.
pub const IDLE_TIMEOUT_MS: TimestampMs = 2 * 60 * 1000;

/// Project status: a pure function of the project's agents and wall-clock.
/// Priority, highest first: blocked > working (fresh) > rate_limited >
/// server_running > idle.
pub fn derive_project_status(project: &Project, now: TimestampMs) -> ProjectStatus {
    derive_with_idle_timeout(project, now, IDLE_TIMEOUT_MS)
}

/// Same as [`derive_project_status`] but with the idle timeout threshold
/// exposed, so the store can apply an operator-configured value instead of
/// the built-in default.
pub(crate) fn derive_with_idle_timeout(
    project: &Project,
    now: TimestampMs,
    idle_timeout_ms: TimestampMs,
) -> ProjectStatus {
    if project.agents.values().any(|a| a.status == AgentStatus::Blocked) {
        return ProjectStatus::Blocked;
    }

    if project
        .agents
        .values()
        .any(|a| is_fresh_working(a, now, idle_timeout_ms))
    {
        return ProjectStatus::Working;
    }

    if project.agents.values().any(|a| a.status == AgentStatus::RateLimited) {
        return ProjectStatus::RateLimited;
    }

    if project.agents.values().any(|a| a.status == AgentStatus::ServerRunning) {
        return ProjectStatus::ServerRunning;
    }

    ProjectStatus::Idle
}

fn is_fresh_working(agent: &Agent, now: TimestampMs, idle_timeout_ms: TimestampMs) -> bool {
    agent.status == AgentStatus::Working && now - agent.last_activity_at < idle_timeout_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_types::{AgentId, AgentType, ProjectId};

    fn project_with(agents: Vec<Agent>) -> Project {
        let mut project = Project::new(ProjectId::new("abc123"), "/a/b".into(), "b".into(), 0);
        for agent in agents {
            project.agents.insert(agent.id.clone(), agent);
        }
        project
    }

    fn agent(id: &str, status: AgentStatus, last_activity_at: TimestampMs) -> Agent {
        let mut a = Agent::new_main(AgentId::new(id), 0);
        a.agent_type = AgentType::Main;
        a.status = status;
        a.last_activity_at = last_activity_at;
        a
    }

    #[test]
    fn blocked_takes_priority_over_everything_else() {
        let project = project_with(vec![
            agent("a1", AgentStatus::Blocked, 0),
            agent("a2", AgentStatus::Working, 0),
        ]);
        assert_eq!(derive_project_status(&project, 1000), ProjectStatus::Blocked);
    }

    #[test]
    fn stale_working_agent_does_not_count_as_working() {
        let project = project_with(vec![agent("a1", AgentStatus::Working, 0)]);
        assert_eq!(
            derive_with_idle_timeout(&project, IDLE_TIMEOUT_MS + 1, IDLE_TIMEOUT_MS),
            ProjectStatus::Idle
        );
    }

    #[test]
    fn fresh_working_agent_makes_project_working() {
        let project = project_with(vec![agent("a1", AgentStatus::Working, 900)]);
        assert_eq!(derive_project_status(&project, 1000), ProjectStatus::Working);
    }

    #[test]
    fn rate_limited_wins_over_server_running() {
        let project = project_with(vec![
            agent("a1", AgentStatus::RateLimited, 0),
            agent("a2", AgentStatus::ServerRunning, 0),
        ]);
        assert_eq!(derive_project_status(&project, 0), ProjectStatus::RateLimited);
    }

    #[test]
    fn no_special_status_agents_is_idle() {
        let project = project_with(vec![agent("a1", AgentStatus::Complete, 0)]);
        assert_eq!(derive_project_status(&project, 0), ProjectStatus::Idle);
    }
}
