use shopee_tracker::listing::{extract_products, read_pager};
use shopee_tracker::{BrowserSession, LaunchOptions};

fn card(name: &str, price: &str, sold: Option<&str>, href: &str, discount: Option<&str>) -> String {
    let sold = sold
        .map(|s| format!("<div class='truncate text-shopee-black87 text-xs min-h-4'>{}</div>", s))
        .unwrap_or_default();
    let discount = discount
        .map(|d| format!("<div data-testid='a11y-label' aria-label='{}'></div>", d))
        .unwrap_or_default();
    format!(
        "<li class='shopee-search-item-result__item'><a href='{}'>\
         <div class='whitespace-normal line-clamp-2'><img alt='Mall'>{}</div>\
         <span class='truncate text-base/5 font-medium'>{}</span>{}{}</a></li>",
        href, name, price, sold, discount
    )
}

fn results_page() -> String {
    let cards = [
        card("Canvas Tote", "12.90", Some("1.2k+ sold"), "https://shopee.sg/Canvas-Tote-i.11.22", Some("Save 15")),
        card("", "4.00", None, "https://shopee.sg/x-i.1.2", None),
        card("Leather Tote", "45.00", None, "https://shopee.sg/Leather-Tote-i.33.44", None),
    ]
    .join("");

    format!(
        "data:text/html,<html><body><ul>{}</ul>\
         <a class='shopee-icon-button shopee-icon-button--left shopee-icon-button--disabled' href='/'></a>\
         <a class='shopee-icon-button shopee-icon-button--right' href='https://shopee.sg/search?keyword=tote&page=1'></a>\
         </body></html>",
        cards
    )
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_extract_products_from_results_page() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    session.navigate(&results_page()).expect("Failed to navigate");
    std::thread::sleep(std::time::Duration::from_millis(500));

    let report = extract_products(&session).expect("Failed to extract");

    assert_eq!(report.page_number, 0);
    assert_eq!(report.products.len(), 2);
    assert_eq!(report.skipped, 1);

    let tote = &report.products[0];
    assert_eq!(tote.name, "Canvas Tote");
    assert_eq!(tote.price, "12.90");
    assert_eq!(tote.sold_count, 1200);
    assert_eq!(tote.discount_rate.as_deref(), Some("Save 15"));
    assert_eq!(tote.display_order, 1);
    assert_eq!(report.products[1].display_order, 3);
}

#[test]
#[ignore]
fn test_read_pager_from_results_page() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    session.navigate(&results_page()).expect("Failed to navigate");
    std::thread::sleep(std::time::Duration::from_millis(500));

    let pager = read_pager(&session).expect("Failed to read pager");

    assert!(pager.prev.present);
    assert!(pager.prev_disabled());
    assert!(!pager.next_disabled());
    assert_eq!(pager.next_url().as_deref(), Some("https://shopee.sg/search?keyword=tote&page=1"));
}

#[test]
#[ignore]
fn test_tool_registry_reports_empty_page() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    session.navigate("data:text/html,<html><body><p>No results</p></body></html>").expect("Failed to navigate");

    let outcome = session
        .execute_tool("extract_products", serde_json::json!({"render": false}))
        .expect("Failed to execute tool");

    assert!(!outcome.success);
}
