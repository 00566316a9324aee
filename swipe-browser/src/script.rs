//! In-page scripts resolving [`Locator`] values.
//!
//! Every script is an immediately invoked function that resolves the
//! serialised locator into an element list and then runs one body over it.

use swipe_core::{Locator, PageError};

const RESOLVER: &str = r"(() => {
  const locator = __LOCATOR__;
  const textOf = (el) => (el.innerText || el.textContent || '').trim();
  const resolve = (loc) => {
    if (typeof loc.css === 'string') {
      return Array.from(document.querySelectorAll(loc.css));
    }
    if (loc.css_with_text) {
      const wanted = loc.css_with_text.text;
      return Array.from(document.querySelectorAll(loc.css_with_text.css))
        .filter((el) => textOf(el).includes(wanted));
    }
    if (typeof loc.following_label === 'string') {
      return Array.from(document.querySelectorAll('body *'))
        .filter((el) => el.childElementCount === 0 && textOf(el) === loc.following_label)
        .map((el) => el.nextElementSibling
          || (el.parentElement && el.parentElement.nextElementSibling))
        .filter((el) => el);
    }
    return [];
  };
  const elements = resolve(locator);
  __BODY__
})()";

/// Whether any element matches.
pub(crate) const EXISTS: &str = "return elements.length > 0;";

/// Non-blank text of every match.
pub(crate) const TEXTS: &str =
    "return elements.map(textOf).filter((text) => text.length > 0);";

/// Absolute link targets of every match or its enclosing anchor.
pub(crate) const LINKS: &str = "return elements
    .map((el) => el.href || (el.closest('a') ? el.closest('a').href : ''))
    .filter((href) => typeof href === 'string' && href.length > 0);";

/// Click the first match, reporting whether one existed.
pub(crate) const CLICK: &str = "const el = elements[0];
  if (!el) { return false; }
  el.scrollIntoView({ block: 'center' });
  el.click();
  return true;";

/// Focus the first match, reporting whether it took focus.
pub(crate) const FOCUS: &str = "const el = elements[0];
  if (!el) { return false; }
  el.focus();
  return document.activeElement === el;";

/// Visible text of the whole document.
pub(crate) const VISIBLE_TEXT: &str = "document.body ? document.body.innerText : ''";

/// Build the script running `body` over the elements `locator` resolves to.
pub(crate) fn locator_script(locator: &Locator, body: &str) -> Result<String, PageError> {
    let encoded = serde_json::to_string(locator).map_err(|err| PageError::Script {
        message: format!("failed to encode locator {locator}: {err}"),
    })?;
    Ok(RESOLVER
        .replacen("__BODY__", body, 1)
        .replacen("__LOCATOR__", &encoded, 1))
}
