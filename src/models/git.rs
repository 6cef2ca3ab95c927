/// Repository state shown in the git segment.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    /// Short branch name; `None` when HEAD is detached
    pub branch: Option<String>,
    pub short_commit: Option<String>,
    pub is_clean: Option<bool>,
    pub ahead: Option<usize>,
    pub behind: Option<usize>,
}
