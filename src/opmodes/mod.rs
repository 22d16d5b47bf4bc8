//! The opmodes this robot ships with.

mod drive_nav;
mod navigate_wall;

pub use drive_nav::DriveNav;
pub use navigate_wall::NavigateWall;

use crate::opmode::OpModeContext;

fn report_mapped(ctx: &mut dyn OpModeContext) {
    let telemetry = ctx.telemetry();
    telemetry.add_data("Hardware", &"mapped");
    telemetry.update();
}
