mod list;

pub use list::TimerList as List;
pub use list::Expired;
