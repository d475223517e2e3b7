/// Instance lifecycle counters for one [`Renderer`](crate::Renderer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub mounts: u64,
    pub updates: u64,
    pub unmounts: u64,
    /// Swaps into the live tree (root renders and `set_state` calls).
    pub commits: u64,
}
