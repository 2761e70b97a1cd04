use clap::Args;
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use costing::{parse_local_datetime, OrderItemEstimate, ProductionSchedule};

#[derive(Args, Debug)]
pub(crate) struct ScheduleArgs {
    /// Delivery time, local, like 2024-12-25T15:00
    #[arg(long)]
    delivery: String,

    /// Production minutes that are already known
    #[arg(long, default_value_t = 0)]
    minutes: i64,

    /// An order line as QUANTITYxMINUTES, for example 2x120. Repeatable.
    #[arg(long = "item", value_parser = parse_item)]
    items: Vec<OrderItemEstimate>,
}

impl ScheduleArgs {
    pub(crate) fn print_schedule(&self) -> Result<()> {
        let delivery_at = parse_local_datetime(&self.delivery)
            .wrap_err_with(|| format!("Invalid delivery time: {}", self.delivery))?;

        let schedule = ProductionSchedule::for_items(delivery_at, self.minutes, &self.items)
            .wrap_err("Failed to plan production")?;

        println!("Delivery:         {}", schedule.delivery_at);
        println!("Production time:  {} min", schedule.total_minutes);
        println!("Buffer:           {} min", schedule.buffer_minutes);
        println!("Start production: {}", schedule.production_start);

        Ok(())
    }
}

fn parse_item(value: &str) -> Result<OrderItemEstimate> {
    let (quantity, minutes) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| eyre!("Expected QUANTITYxMINUTES, got {value}"))?;

    Ok(OrderItemEstimate {
        quantity: quantity.trim().parse().wrap_err("Invalid quantity")?,
        minutes_per_unit: minutes.trim().parse().wrap_err("Invalid minutes")?,
    })
}
