/// Presentation boundary. The agent loop emits status, log and error events
/// through this trait and pulls instructions from it; rendering is entirely
/// the implementor's concern.
pub trait Frontend {
    fn show_status(&mut self, text: &str);
    fn show_log_window(&mut self, lines: &[String]);
    fn show_error(&mut self, text: &str);
    /// Next user instruction, or `None` when the session should end.
    fn next_instruction(&mut self) -> Option<String>;
}
