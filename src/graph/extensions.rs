use crate::graph::{
    amplify::{Amplify, Gain},
    mix::Mix,
    node::GraphNode,
    through::Through,
};

/// Fluent combinators for building chains.
pub trait NodeExt: GraphNode + Sized {
    fn amplify<M>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn gain(self, gain: f32) -> Gain<Self> {
        Gain::new(self, gain)
    }

    fn through<F: GraphNode>(self, filter: F) -> Through<Self, F> {
        Through::new(self, filter)
    }

    fn sum<M: GraphNode>(self, source: M) -> Mix<Self, M> {
        Mix::weighted(self, source, 1.0, 1.0)
    }
}

impl<T: GraphNode> NodeExt for T {}
