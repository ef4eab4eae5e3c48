use order_sim_engine::CanonicalOrder;
use order_sim_server::data_objects::{GenerationResponse, SchedulerStatus};
use osim_common::format_money;
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

pub fn format_orders(orders: &[CanonicalOrder]) -> String {
    if orders.is_empty() {
        return "No orders".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row![
        "Platform",
        "External id",
        "Order #",
        "Customer",
        "Status",
        "Items",
        "Subtotal",
        "Tax",
        "Shipping",
        "Discount",
        "Total",
        "Currency",
    ]);
    for order in orders {
        table.add_row(row![
            order.platform,
            order.external_id,
            order.order_number,
            order.customer_name,
            order.status,
            order.items.len(),
            r->format_money(order.subtotal),
            r->format_money(order.tax),
            r->format_money(order.shipping_cost),
            r->format_money(order.discount),
            r->format_money(order.total_amount),
            order.currency,
        ]);
    }
    markdown_style(&mut table);
    table.to_string()
}

pub fn format_generation_response(response: &GenerationResponse) -> String {
    let mut table = Table::new();
    table.set_titles(row!["Generated", "Published", "Failed"]);
    table.add_row(row![r->response.counters.generated, r->response.counters.published, r->response.counters.failed]);
    markdown_style(&mut table);
    match &response.error {
        Some(error) => format!("{table}\nFirst failure: {error}"),
        None => table.to_string(),
    }
}

pub fn format_scheduler_status(status: &SchedulerStatus) -> String {
    let state = if status.running { "running" } else { "stopped" };
    let mut table = Table::new();
    table.set_titles(row!["Platform", "Integration"]);
    for p in &status.platforms {
        table.add_row(row![p.platform, r->p.integration_id]);
    }
    markdown_style(&mut table);
    format!(
        "Scheduler {state}. {} order(s) per channel every {}s, {} tick(s) so far\n{table}",
        status.orders_per_batch, status.interval_secs, status.ticks
    )
}
