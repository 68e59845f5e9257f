mod grid;
mod widget;
pub(crate) use self::grid::{days_in_month, move_within_month};
pub(crate) use self::widget::{MonthGrid, HEIGHT, MAIN_WIDTH};
