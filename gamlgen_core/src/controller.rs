/// A state of a controller finite-state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    /// Id of the state vertex.
    pub id: String,
    /// State name.
    pub name: String,
    /// Whether this is the entry point of the machine.
    pub initial: bool,
    /// Whether this is the final point of the machine.
    pub r#final: bool,
    /// Actions performed while in the state, in property order.
    pub actions: Vec<String>,
    /// Outgoing transitions, in document order.
    pub transitions: Vec<StateTransition>,
}

impl ControllerState {
    /// Reserved name of the initial state.
    pub const ENTRY_POINT: &'static str = "EntryPoint";
    /// Reserved name of the final state.
    pub const FINAL_POINT: &'static str = "FinalPoint";

    /// Creates a state without actions or transitions,
    /// detecting initial and final states by name.
    ///
    /// ```
    /// # use gamlgen_core::ControllerState;
    /// let state = ControllerState::new("s0".to_string(), "EntryPoint".to_string());
    /// assert!(state.initial);
    /// assert!(!state.r#final);
    /// ```
    pub fn new(id: String, name: String) -> Self {
        let initial = name == Self::ENTRY_POINT;
        let r#final = name == Self::FINAL_POINT;
        Self {
            id,
            name,
            initial,
            r#final,
            actions: Vec::new(),
            transitions: Vec::new(),
        }
    }
}

/// A guarded transition between two states of the same machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    /// Id of the transition.
    pub id: String,
    /// Name of the target state.
    pub target: String,
    /// Guard condition, an opaque boolean expression.
    pub condition: String,
    /// Actions performed when the transition fires.
    pub actions: Vec<String>,
}
