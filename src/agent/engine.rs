use crate::agent::history::SessionHistory;
use crate::agent::state::{LoopConfig, LoopState};
use crate::errors::GhosthandResult;
use crate::executor::device::PointerDevice;
use crate::executor::input::InputActuator;
use crate::frontend::Frontend;
use crate::llm::client::DecisionSource;
use crate::llm::types::ActionKind;
use crate::perception::screenshot::ScreenSource;

/// One instruction becomes up to `max_steps` perceive → decide → act steps.
/// The loop is intentionally sequential: every capture, model call and
/// dispatch blocks until complete, and at most one decision call and one
/// action dispatch happen per step.
pub struct AgentLoop<S, D, P>
where
    S: ScreenSource,
    D: DecisionSource,
    P: PointerDevice,
{
    screen: S,
    decider: D,
    actuator: InputActuator<P>,
    history: SessionHistory,
    config: LoopConfig,
    state: LoopState,
}

impl<S, D, P> AgentLoop<S, D, P>
where
    S: ScreenSource,
    D: DecisionSource,
    P: PointerDevice,
{
    pub fn new(screen: S, decider: D, actuator: InputActuator<P>, config: LoopConfig) -> Self {
        Self {
            screen,
            decider,
            actuator,
            history: SessionHistory::new(),
            config,
            state: LoopState::AwaitingInstruction,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Drop all session context. History otherwise carries forward across
    /// instructions.
    pub fn reset_session(&mut self) {
        self.history.reset();
        self.state = LoopState::AwaitingInstruction;
    }

    /// Run one instruction to termination: explicit DONE, step-budget
    /// exhaustion, or a capability failure (which propagates uncaught — the
    /// step simply aborts).
    pub fn run_instruction<F: Frontend>(
        &mut self,
        instruction: &str,
        frontend: &mut F,
    ) -> GhosthandResult<()> {
        tracing::info!(instruction = %instruction, budget = self.config.max_steps, "instruction received");
        self.history.push_instruction(instruction);

        for step in 1..=self.config.max_steps {
            self.state = LoopState::Stepping { step };
            frontend.show_status(&format!("Step {step}: analyzing screen..."));

            let frame = self.screen.capture()?;
            let decision = self
                .decider
                .decide(instruction, self.history.context_window(), &frame);
            tracing::info!(step, action = %decision.action, reasoning = %decision.reasoning, "step decided");
            self.history.push_decision(decision.action, &decision.reasoning);

            match decision.action {
                ActionKind::Click => {
                    if let Some((x, y)) = decision.coordinates {
                        self.actuator.move_to(x, y)?;
                        self.actuator.click()?;
                    }
                }
                ActionKind::Type => {
                    if let Some(text) = decision.text.as_deref() {
                        if !text.is_empty() {
                            self.actuator.type_text(text)?;
                        }
                    }
                }
                ActionKind::Done => {
                    tracing::info!(step, "model signalled completion");
                    break;
                }
                // SCROLL is decoded but not executed; WAIT is the absorbed
                // failure case. Neither dispatches physical input.
                ActionKind::Scroll | ActionKind::Wait => {}
            }

            frontend.show_log_window(self.history.display_window());
            std::thread::sleep(self.config.step_delay);
        }

        self.state = LoopState::Terminated;
        frontend.show_status("Done!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use super::*;
    use crate::errors::GhosthandError;
    use crate::llm::types::Decision;
    use crate::perception::screenshot::Frame;

    struct StaticScreen;

    impl ScreenSource for StaticScreen {
        fn capture(&self) -> GhosthandResult<Frame> {
            Ok(Frame {
                jpeg: Vec::new(),
                width: 1920,
                height: 1080,
            })
        }
    }

    struct FailingScreen;

    impl ScreenSource for FailingScreen {
        fn capture(&self) -> GhosthandResult<Frame> {
            Err(GhosthandError::Perception("permission denied".into()))
        }
    }

    /// Plays back a scripted decision sequence and records the history
    /// window passed to each call.
    struct ScriptedDecider {
        script: RefCell<VecDeque<Decision>>,
        seen_windows: RefCell<Vec<Vec<String>>>,
    }

    impl ScriptedDecider {
        fn new(script: Vec<Decision>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                seen_windows: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen_windows.borrow().len()
        }
    }

    impl DecisionSource for ScriptedDecider {
        fn decide(&self, _instruction: &str, history: &[String], _frame: &Frame) -> Decision {
            self.seen_windows.borrow_mut().push(history.to_vec());
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Decision::wait("script exhausted"))
        }
    }

    #[derive(Default)]
    struct RecordingDevice {
        clicks: u32,
        keys: Vec<char>,
        moves: Vec<(i32, i32)>,
    }

    impl PointerDevice for RecordingDevice {
        fn position(&mut self) -> GhosthandResult<(i32, i32)> {
            Ok(self.moves.last().copied().unwrap_or((0, 0)))
        }

        fn move_to(&mut self, x: i32, y: i32) -> GhosthandResult<()> {
            self.moves.push((x, y));
            Ok(())
        }

        fn click(&mut self) -> GhosthandResult<()> {
            self.clicks += 1;
            Ok(())
        }

        fn send_key(&mut self, ch: char) -> GhosthandResult<()> {
            self.keys.push(ch);
            Ok(())
        }

        fn screen_size(&mut self) -> GhosthandResult<(u32, u32)> {
            Ok((1920, 1080))
        }
    }

    #[derive(Default)]
    struct RecordingFrontend {
        statuses: Vec<String>,
        log_windows: Vec<Vec<String>>,
        errors: Vec<String>,
    }

    impl Frontend for RecordingFrontend {
        fn show_status(&mut self, text: &str) {
            self.statuses.push(text.to_string());
        }

        fn show_log_window(&mut self, lines: &[String]) {
            self.log_windows.push(lines.to_vec());
        }

        fn show_error(&mut self, text: &str) {
            self.errors.push(text.to_string());
        }

        fn next_instruction(&mut self) -> Option<String> {
            None
        }
    }

    fn test_config(max_steps: u32) -> LoopConfig {
        LoopConfig::new(max_steps, Duration::ZERO)
    }

    fn click(x: i32, y: i32) -> Decision {
        Decision {
            action: ActionKind::Click,
            reasoning: "x".into(),
            coordinates: Some((x, y)),
            text: None,
            scroll_amount: None,
        }
    }

    fn done(reasoning: &str) -> Decision {
        Decision {
            action: ActionKind::Done,
            reasoning: reasoning.into(),
            coordinates: None,
            text: None,
            scroll_amount: None,
        }
    }

    #[test]
    fn budget_exhaustion_runs_exactly_n_steps() {
        let decider = ScriptedDecider::new(vec![
            Decision::wait("1"),
            Decision::wait("2"),
            Decision::wait("3"),
            Decision::wait("never reached"),
        ]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(3),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("wait around", &mut frontend).unwrap();

        assert_eq!(agent.decider.calls(), 3);
        assert_eq!(agent.state(), &LoopState::Terminated);
        assert_eq!(frontend.statuses.last().map(String::as_str), Some("Done!"));
    }

    #[test]
    fn done_terminates_before_budget() {
        let decider = ScriptedDecider::new(vec![
            Decision::wait("thinking"),
            done("finished"),
            Decision::wait("never reached"),
        ]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(5),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("short task", &mut frontend).unwrap();

        assert_eq!(agent.decider.calls(), 2);
        assert_eq!(agent.history().last(), Some("DONE: finished"));
        // The DONE step breaks out before the log window is emitted.
        assert_eq!(frontend.log_windows.len(), 1);
    }

    #[test]
    fn click_scenario_dispatches_twice_then_stops() {
        let decider = ScriptedDecider::new(vec![click(100, 200), click(100, 200), done("done")]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(3),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("click button", &mut frontend).unwrap();

        assert_eq!(agent.decider.calls(), 3);
        assert_eq!(agent.actuator_device().clicks, 2);
        assert_eq!(agent.actuator_device().moves.last(), Some(&(100, 200)));
        assert_eq!(agent.history().last(), Some("DONE: done"));
    }

    #[test]
    fn click_without_coordinates_is_a_noop() {
        let decider = ScriptedDecider::new(vec![Decision {
            action: ActionKind::Click,
            reasoning: "no target".into(),
            coordinates: None,
            text: None,
            scroll_amount: None,
        }]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(1),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("click nothing", &mut frontend).unwrap();

        assert_eq!(agent.actuator_device().clicks, 0);
        assert!(agent.actuator_device().moves.is_empty());
    }

    #[test]
    fn type_without_text_is_a_noop() {
        let empty = Decision {
            action: ActionKind::Type,
            reasoning: "nothing to say".into(),
            coordinates: None,
            text: Some(String::new()),
            scroll_amount: None,
        };
        let absent = Decision {
            text: None,
            ..empty.clone()
        };
        let decider = ScriptedDecider::new(vec![empty, absent]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(2),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("type nothing", &mut frontend).unwrap();

        assert!(agent.actuator_device().keys.is_empty());
    }

    #[test]
    fn type_dispatches_per_character() {
        let decider = ScriptedDecider::new(vec![
            Decision {
                action: ActionKind::Type,
                reasoning: "fill the field".into(),
                coordinates: None,
                text: Some("hi".into()),
                scroll_amount: None,
            },
            done("typed"),
        ]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(2),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("say hi", &mut frontend).unwrap();

        assert_eq!(agent.actuator_device().keys, vec!['h', 'i']);
    }

    #[test]
    fn decision_context_is_last_two_entries_before_each_step() {
        let decider = ScriptedDecider::new(vec![
            Decision::wait("w1"),
            Decision::wait("w2"),
            Decision::wait("w3"),
        ]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(3),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("do thing", &mut frontend).unwrap();

        let windows = agent.decider.seen_windows.borrow();
        assert_eq!(windows[0], vec!["User: do thing".to_string()]);
        assert_eq!(
            windows[1],
            vec!["User: do thing".to_string(), "WAIT: w1".to_string()]
        );
        assert_eq!(
            windows[2],
            vec!["WAIT: w1".to_string(), "WAIT: w2".to_string()]
        );
    }

    #[test]
    fn history_carries_forward_across_instructions() {
        let decider = ScriptedDecider::new(vec![done("first"), Decision::wait("w")]);
        let mut agent = AgentLoop::new(
            StaticScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(1),
        );
        let mut frontend = RecordingFrontend::default();

        agent.run_instruction("task one", &mut frontend).unwrap();
        agent.run_instruction("task two", &mut frontend).unwrap();

        // Second instruction's first decision sees the tail of the first.
        let windows = agent.decider.seen_windows.borrow();
        assert_eq!(
            windows[1],
            vec!["DONE: first".to_string(), "User: task two".to_string()]
        );
    }

    #[test]
    fn capture_failure_propagates() {
        let decider = ScriptedDecider::new(vec![Decision::wait("unused")]);
        let mut agent = AgentLoop::new(
            FailingScreen,
            decider,
            InputActuator::new(RecordingDevice::default()),
            test_config(3),
        );
        let mut frontend = RecordingFrontend::default();

        let result = agent.run_instruction("doomed", &mut frontend);
        assert!(matches!(result, Err(GhosthandError::Perception(_))));
        // The decision call never happened for the aborted step.
        assert_eq!(agent.decider.calls(), 0);
    }

    impl<S, D, P> AgentLoop<S, D, P>
    where
        S: ScreenSource,
        D: DecisionSource,
        P: PointerDevice,
    {
        fn actuator_device(&self) -> &P {
            self.actuator.device_ref()
        }
    }
}
