//! Identifier case conversions.
//!
//! Generated file names use `snake_case`, generated types and canonical
//! method names use `PascalCase`.

/// Converts a `snake_case` (or already `PascalCase`) name to `PascalCase`.
///
/// # Examples
///
/// ```
/// use svckit_core::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("fetch"), "Fetch");
/// assert_eq!(to_pascal_case("get_user_data"), "GetUserData");
/// assert_eq!(to_pascal_case("GetUser"), "GetUser");
/// ```
#[must_use]
pub fn to_pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut capitalize_next = true;

    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(ch.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}

/// Converts a `PascalCase` or `camelCase` name to `snake_case`.
///
/// Runs of capitals are kept together (`HTTPServer` becomes `http_server`).
///
/// # Examples
///
/// ```
/// use svckit_core::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("GetUser"), "get_user");
/// assert_eq!(to_snake_case("fetch"), "fetch");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// assert_eq!(to_snake_case("my-app"), "my_app");
/// ```
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '-' {
            result.push('_');
            continue;
        }
        if ch.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }

    result
}
