// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mission scripts: ordered send/receive sequences grouped into phases.
//!
//! Execution is purely sequential on one logical thread - step N+1 never
//! begins before step N completes. Failure policy rides on each step's
//! [`Criticality`] tag rather than being hardcoded: the builder defaults
//! preserve the ground-control asymmetry where a command that cannot be
//! transmitted invalidates everything that follows (send = fatal) while
//! telemetry may legitimately be delayed or lost without invalidating the
//! sequence (receive = recoverable).

use crate::exchange::{Criticality, StepContext};
use crate::msg::{Message, MessageType};
use crate::transport::Transport;
use std::fmt;

/// Direction of one scripted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Send,
    Receive,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Send => write!(f, "send"),
            StepKind::Receive => write!(f, "receive"),
        }
    }
}

enum StepAction {
    /// Publish this populated message.
    Send(Box<dyn Message>),
    /// Receive into this (default-constructed) expected message.
    Receive(Box<dyn Message>),
}

/// One scripted exchange step.
pub struct ScriptStep {
    action: StepAction,
    criticality: Criticality,
}

impl ScriptStep {
    pub fn kind(&self) -> StepKind {
        match self.action {
            StepAction::Send(_) => StepKind::Send,
            StepAction::Receive(_) => StepKind::Receive,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.action {
            StepAction::Send(msg) | StepAction::Receive(msg) => msg.type_name(),
        }
    }

    pub fn criticality(&self) -> Criticality {
        self.criticality
    }

    /// The step's message; for receive steps this holds the decoded
    /// telemetry after a successful run.
    pub fn message(&self) -> &dyn Message {
        match &self.action {
            StepAction::Send(msg) | StepAction::Receive(msg) => msg.as_ref(),
        }
    }
}

/// A named group of consecutive steps.
pub struct Phase {
    name: String,
    steps: Vec<ScriptStep>,
}

impl Phase {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

/// Per-run policy knobs.
#[derive(Debug, Clone, Default)]
pub struct RunPolicy {
    /// Replay the read channel's subscriptions after a failed receive.
    /// Off by default; whether a receive failure warrants channel
    /// re-validation is deployment-specific.
    pub resubscribe_on_recv_failure: bool,
}

/// What happened to one attempted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Sent { bytes: usize },
    Received { bytes: usize },
    Failed { reason: String },
}

impl StepResult {
    pub fn is_ok(&self) -> bool {
        !matches!(self, StepResult::Failed { .. })
    }
}

/// Record of one attempted step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub phase: String,
    pub kind: StepKind,
    pub type_name: &'static str,
    pub criticality: Criticality,
    pub result: StepResult,
}

/// Terminal state of a script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStatus {
    /// Every phase was attempted (recoverable failures included).
    Completed,
    /// A fatal step failed; later steps were never attempted.
    Aborted {
        phase: String,
        type_name: &'static str,
    },
}

/// Full record of a script run. Steps that were never attempted because of
/// an abort do not appear in `outcomes`.
#[derive(Debug, Clone)]
pub struct ScriptReport {
    pub status: ScriptStatus,
    pub outcomes: Vec<StepOutcome>,
}

impl ScriptReport {
    /// Whether the run reached the end of the script. Recoverable failures
    /// do not count against completion.
    pub fn succeeded(&self) -> bool {
        self.status == ScriptStatus::Completed
    }
}

/// A strictly ordered mission: phases of send/expect steps.
pub struct MissionScript {
    phases: Vec<Phase>,
}

impl MissionScript {
    pub fn builder() -> MissionScriptBuilder {
        MissionScriptBuilder { phases: Vec::new() }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Run the script to completion or first fatal failure.
    pub fn run(
        &mut self,
        ctx: &mut StepContext<'_>,
        tx: &mut dyn Transport,
        rx: &mut dyn Transport,
        policy: &RunPolicy,
    ) -> ScriptReport {
        let mut outcomes = Vec::new();

        for phase in &mut self.phases {
            log::info!("[MISSION] phase '{}'", phase.name);
            for step in &mut phase.steps {
                let type_name = step.type_name();
                let kind = step.kind();
                let criticality = step.criticality;

                let result = match &mut step.action {
                    StepAction::Send(msg) => match ctx.send(tx, msg.as_ref()) {
                        Ok(bytes) => StepResult::Sent { bytes },
                        Err(e) => StepResult::Failed {
                            reason: e.to_string(),
                        },
                    },
                    StepAction::Receive(expected) => {
                        match ctx.receive(rx, expected.as_mut()) {
                            Ok(bytes) => StepResult::Received { bytes },
                            Err(e) => StepResult::Failed {
                                reason: e.to_string(),
                            },
                        }
                    }
                };

                let failed = !result.is_ok();
                outcomes.push(StepOutcome {
                    phase: phase.name.clone(),
                    kind,
                    type_name,
                    criticality,
                    result,
                });

                if !failed {
                    continue;
                }
                if kind == StepKind::Receive && policy.resubscribe_on_recv_failure {
                    match rx.resubscribe() {
                        Ok(()) => log::info!("[MISSION] resubscribed after failed receive"),
                        Err(e) => log::warn!("[MISSION] resubscribe failed: {}", e),
                    }
                }
                match criticality {
                    Criticality::Fatal => {
                        log::error!(
                            "[MISSION] aborting in phase '{}': {} {} failed",
                            phase.name,
                            kind,
                            type_name
                        );
                        return ScriptReport {
                            status: ScriptStatus::Aborted {
                                phase: phase.name.clone(),
                                type_name,
                            },
                            outcomes,
                        };
                    }
                    Criticality::Recoverable => {
                        log::warn!(
                            "[MISSION] continuing after recoverable {} failure for {}",
                            kind,
                            type_name
                        );
                    }
                }
            }
        }

        log::info!("[MISSION] script complete ({} step(s))", outcomes.len());
        ScriptReport {
            status: ScriptStatus::Completed,
            outcomes,
        }
    }
}

/// Builder for [`MissionScript`]. Steps land in the most recently declared
/// phase; declaring none puts everything in an implicit `"mission"` phase.
pub struct MissionScriptBuilder {
    phases: Vec<Phase>,
}

impl MissionScriptBuilder {
    pub fn phase(mut self, name: impl Into<String>) -> Self {
        self.phases.push(Phase {
            name: name.into(),
            steps: Vec::new(),
        });
        self
    }

    /// Send step, fatal on failure (the default for commands).
    pub fn send(self, msg: impl Message + 'static) -> Self {
        self.send_with(msg, Criticality::Fatal)
    }

    pub fn send_with(mut self, msg: impl Message + 'static, criticality: Criticality) -> Self {
        self.current_phase().steps.push(ScriptStep {
            action: StepAction::Send(Box::new(msg)),
            criticality,
        });
        self
    }

    /// Receive step for one `T`, recoverable on failure (the default for
    /// telemetry).
    pub fn expect<T: MessageType>(self) -> Self {
        self.expect_with::<T>(Criticality::Recoverable)
    }

    pub fn expect_with<T: MessageType>(mut self, criticality: Criticality) -> Self {
        self.current_phase().steps.push(ScriptStep {
            action: StepAction::Receive(Box::new(T::default())),
            criticality,
        });
        self
    }

    pub fn build(self) -> MissionScript {
        MissionScript {
            phases: self.phases,
        }
    }

    fn current_phase(&mut self) -> &mut Phase {
        if self.phases.is_empty() {
            self.phases.push(Phase {
                name: "mission".to_string(),
                steps: Vec::new(),
            });
        }
        self.phases.last_mut().expect("at least one phase")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::cmasi::{AirVehicleState, GoToWaypointAction, MissionCommand};

    #[test]
    fn builder_groups_steps_into_phases() {
        let script = MissionScript::builder()
            .phase("navigate to rescue site")
            .send(MissionCommand::default())
            .expect::<AirVehicleState>()
            .phase("task camera sensor")
            .send(GoToWaypointAction::default())
            .build();

        let phases = script.phases();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].name(), "navigate to rescue site");
        assert_eq!(phases[0].steps().len(), 2);
        assert_eq!(phases[1].steps().len(), 1);

        let steps = phases[0].steps();
        assert_eq!(steps[0].kind(), StepKind::Send);
        assert_eq!(steps[0].criticality(), Criticality::Fatal);
        assert_eq!(steps[1].kind(), StepKind::Receive);
        assert_eq!(steps[1].criticality(), Criticality::Recoverable);
        assert_eq!(steps[1].type_name(), "AirVehicleState");
    }

    #[test]
    fn steps_without_phase_land_in_implicit_phase() {
        let script = MissionScript::builder()
            .send(GoToWaypointAction::default())
            .build();
        assert_eq!(script.phases().len(), 1);
        assert_eq!(script.phases()[0].name(), "mission");
    }

    #[test]
    fn criticality_overrides_apply() {
        let script = MissionScript::builder()
            .send_with(MissionCommand::default(), Criticality::Recoverable)
            .expect_with::<AirVehicleState>(Criticality::Fatal)
            .build();
        let steps = script.phases()[0].steps();
        assert_eq!(steps[0].criticality(), Criticality::Recoverable);
        assert_eq!(steps[1].criticality(), Criticality::Fatal);
    }
}
