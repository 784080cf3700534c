#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage { mount: u64, page: u32, page_size: u32 },
    /// Restart the debounce window for a query edit.
    ScheduleFilter { mount: u64, query: String, delay_ms: u64 },
    CancelFilter,
    LoadDetail { mount: u64, id: u32 },
    LoadSprite { mount: u64, id: u32, url: String },
    /// Drop page and filter work belonging to a list screen being left.
    CancelList,
    CancelDetail,
}
