//! Waypoint stepping: the minimal movement model the scheduler applies
//! after tasks have run.

use tc_task::AgentState;
use tc_world::PathResult;

/// Walk `agent` along `path` for `dt_secs` at the path's speed.
///
/// Waypoints reached within the step are consumed and the remaining
/// distance carries over to the next one.  The path is marked finished
/// once its last waypoint is reached.  Returns the distance covered.
pub fn step(agent: &mut AgentState, path: &mut PathResult, dt_secs: f32) -> f32 {
    let mut budget = path.speed.max(0.0) * dt_secs;
    let mut walked = 0.0;

    while !path.is_finished() {
        let Some(target) = path.next_waypoint() else {
            path.finished = true;
            break;
        };
        let to_target = target - agent.position;
        let dist = to_target.magnitude();

        if dist <= budget {
            agent.position = target;
            budget -= dist;
            walked += dist;
            path.advance();
        } else {
            agent.position = agent.position + to_target * (budget / dist);
            walked += budget;
            break;
        }
    }
    walked
}
