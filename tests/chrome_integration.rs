use cuehand::{BrowserSession, Cuehand, CuehandConfig, LaunchOptions, Locator, PageDriver, ResolutionStrategy,
              ScriptedOracle};
use serde_json::json;
use std::time::Duration;

const LOGIN_PAGE: &str = r##"<html><body>
    <form onsubmit="event.preventDefault(); document.title = 'submitted:' + document.getElementById('user').value;">
        <label for="user">Username</label><input id="user" name="username">
        <button type="submit"><span>Log in</span></button>
        <button style="display:none">Log in</button>
    </form>
    <ul><li><a href="#a">Alpha</a></li><li><a href="#b">Beta</a></li></ul>
</body></html>"##;

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

fn launch() -> BrowserSession {
    BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_locators_count_in_page() {
    let session = launch();
    let page = session.page().expect("Failed to get page");
    page.navigate(&data_url(LOGIN_PAGE)).expect("Failed to navigate");

    assert_eq!(page.count(&Locator::css("a")).unwrap(), 2);
    assert_eq!(page.count(&Locator::xpath("//span[contains(text(), \"Log in\")]/ancestor::button")).unwrap(), 1);
    // the hidden button has no accessible role match
    assert_eq!(page.count(&Locator::role("button", "Log in")).unwrap(), 1);
    assert_eq!(page.count(&Locator::role("button", "Log")).unwrap(), 0);
    assert_eq!(page.count(&Locator::role("textbox", "Username")).unwrap(), 1);
    assert!(page.count(&Locator::css("a[")).is_err());
}

#[test]
#[ignore]
fn test_fill_and_click_through_engine() {
    let session = launch();
    let page = session.page().expect("Failed to get page");
    page.navigate(&data_url(LOGIN_PAGE)).expect("Failed to navigate");

    let oracle = ScriptedOracle::new()
        .respond(json!({"role": "textbox", "targetText": "Username", "action": "fill", "value": "alice"}))
        .respond(json!({"role": "button", "targetText": "Log in", "action": "click"}));
    let config = CuehandConfig::new()
        .strategy(ResolutionStrategy::Role)
        .settle_delay(Duration::from_millis(100));
    let cuehand = Cuehand::with_config(&page, &oracle, config);

    assert!(cuehand.act("type alice into the username field").unwrap().success);
    assert!(cuehand.act("click the 'Log in' button").unwrap().success);

    let title = page
        .tab()
        .get_title()
        .expect("Failed to read title");
    assert_eq!(title, "submitted:alice");
}

#[test]
#[ignore]
fn test_select_outer_html_clones_elements() {
    let session = launch();
    let page = session.page().expect("Failed to get page");
    page.navigate(&data_url(LOGIN_PAGE)).expect("Failed to navigate");

    let html = page.select_outer_html(&["a"]).expect("Failed to select elements");
    assert_eq!(html, r##"<a href="#a">Alpha</a><a href="#b">Beta</a>"##);
}

#[test]
#[ignore]
fn test_content_is_sanitized() {
    let session = launch();
    let page = session.page().expect("Failed to get page");
    let cuehand = Cuehand::new(&page, ScriptedOracle::new());
    cuehand.goto(&data_url(LOGIN_PAGE)).expect("Failed to navigate");

    let content = cuehand.content().expect("Failed to read content");
    assert!(!content.contains("<body"));
    assert!(content.contains("<label for=\"user\">Username</label>"));
}
