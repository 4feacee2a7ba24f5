pub mod machine;
pub mod locomotion;

pub use machine::{State, StateConstructor, StateMachine, Transition};
pub use locomotion::{
    AnimationRig, DANCE, IDLE, LOCOMOTION_STATES, LocomotionMachine, LocomotionState, RUN, WALK,
    synced_start_time,
};
