use fragment_sync::{Error, Page, Result, SelectionSync};

// Markup shaped like the survey result pages this crate grew out of: a
// model response viewer with one radio per response and the original page
// script left inline.
fn model_page() -> &'static str {
    r#"
    <html>
    <head>
      <title>gpt-4</title>
      <link rel='stylesheet' href='style.css'>
    </head>
    <body>
      <nav>
        <a href='index.html'>All models</a>
        <a href='claude-3.html'>claude-3</a>
      </nav>
      <main>
        <h1>gpt-4</h1>
        <form id='responses'>
          <input id='response-1' type='radio' name='response'>
          <label for='response-1'>First response</label>
          <div class='item'><p>The capital of France is <b>Paris</b>.</p></div>

          <input id='response-2' type='radio' name='response'>
          <label for='response-2'>Second response</label>
          <div class='item'><pre><code>fn main() {}</code></pre></div>

          <input id='response-3' type='radio' name='response'>
          <label for='response-3'>Third response</label>
          <div class='item'><p>It depends.</p></div>
        </form>
      </main>
      <script>
        document.addEventListener('DOMContentLoaded', function() {
            const anchor = window.location.hash.substring(1);
            const radio = document.getElementById(anchor);
            if (radio && radio.type === 'radio') {
                radio.checked = true;
            } else {
                const defaultRadio = document.getElementById('response-1');
                if (defaultRadio) defaultRadio.checked = true;
            }
            document.addEventListener('change', function(event) {
                if (event.target.type === 'radio') {
                    window.location.hash = event.target.id;
                }
            });
        });
      </script>
    </body>
    </html>
    "#
}

#[test]
fn deep_link_then_browse_then_back() -> Result<()> {
    let mut page =
        Page::from_html_with_url("https://survey.local/gpt-4.html#response-2", model_page())?;
    page.install(SelectionSync::new());

    page.assert_checked("#response-2", true)?;
    page.assert_checked("#response-1", false)?;
    page.assert_text("label[for=response-2]", "Second response")?;

    page.click("#response-3")?;
    page.assert_fragment("response-3")?;
    page.assert_checked("#response-3", true)?;
    page.assert_checked("#response-2", false)?;

    assert!(page.back()?);
    page.assert_fragment("response-2")?;
    // Selection stays where the user left it; only the URL walked back.
    page.assert_checked("#response-3", true)?;
    Ok(())
}

#[test]
fn inline_page_script_stays_inert() -> Result<()> {
    let mut page = Page::from_html_with_url("https://survey.local/gpt-4.html", model_page())?;

    // Before install nothing is selected; the <script> element is plain text.
    page.assert_checked("#response-1", false)?;
    let script = page.dump_dom("script")?;
    assert!(script.contains("DOMContentLoaded"));

    page.install(SelectionSync::new());
    page.assert_checked("#response-1", true)?;
    Ok(())
}

#[test]
fn independent_forms_keep_independent_groups() -> Result<()> {
    let html = r#"
    <form id='first'>
      <input id='response-1' type='radio' name='response'>
      <input id='response-2' type='radio' name='response'>
    </form>
    <form id='second'>
      <input id='other-1' type='radio' name='response'>
      <input id='other-2' type='radio' name='response'>
    </form>
    "#;

    let mut page = Page::from_html_with_url("https://survey.local/", html)?;
    page.install(SelectionSync::new());
    page.assert_checked("#response-1", true)?;

    page.click("#other-2")?;
    page.assert_checked("#other-2", true)?;
    page.assert_checked("#response-1", true)?;
    page.assert_fragment("other-2")?;

    page.click("#response-2")?;
    page.assert_checked("#response-2", true)?;
    page.assert_checked("#response-1", false)?;
    page.assert_checked("#other-2", true)?;
    page.assert_fragment("response-2")?;
    Ok(())
}

#[test]
fn reloaded_response_list_keeps_synchronizing() -> Result<()> {
    let mut page = Page::from_html_with_url("https://survey.local/gpt-4.html", model_page())?;
    page.install(SelectionSync::new());

    page.set_inner_html(
        "#responses",
        r#"
        <input id='response-1' type='radio' name='response'>
        <label for='response-1'>Rewritten first</label>
        <input id='response-4' type='radio' name='response'>
        <label for='response-4'>Brand new fourth</label>
        "#,
    )?;

    page.assert_text("label[for=response-4]", "Brand new fourth")?;
    assert!(matches!(
        page.assert_exists("#response-2"),
        Err(Error::SelectorNotFound(_))
    ));

    page.click("#response-4")?;
    page.assert_fragment("response-4")?;
    page.assert_checked("#response-4", true)?;
    Ok(())
}

#[test]
fn survey_flow_records_every_navigation() -> Result<()> {
    let mut page = Page::from_html_with_url("https://survey.local/gpt-4.html", model_page())?;
    page.install(SelectionSync::new());

    page.click("#response-2")?;
    page.click("#response-3")?;
    page.click("#response-1")?;

    let navigations = page.navigations();
    assert_eq!(navigations.len(), 3);
    assert!(navigations[0].to.ends_with("#response-2"));
    assert!(navigations[1].to.ends_with("#response-3"));
    assert!(navigations[2].to.ends_with("#response-1"));
    assert_eq!(navigations[1].from, navigations[0].to);
    assert_eq!(page.history_length(), 4);
    Ok(())
}
