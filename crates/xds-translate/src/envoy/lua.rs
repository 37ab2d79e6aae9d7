//! Misdirected request guard for SNI filter chains.
//!
//! A client may open a TLS connection for one SNI name and then send a
//! request whose `:authority` names a different host. The script installed on
//! each SNI chain rejects those requests with 421.

use xds_core::TypedMessage;
use xds_types::filters::{HttpFilter, Lua};
use xds_types::wellknown;

/// HTTP filter rejecting requests whose authority does not match `server_name`.
pub fn misdirected_request_filter(server_name: &str) -> HttpFilter {
    HttpFilter::typed(
        wellknown::LUA,
        Lua {
            inline_code: misdirected_request_script(server_name),
        }
        .to_any(),
    )
}

/// Lua source comparing the lowercased authority, without any port, to the
/// lowercased server name.
///
/// A wildcard name `*.example.com` admits exactly one label in front of
/// `.example.com`, as SNI matching does.
pub fn misdirected_request_script(server_name: &str) -> String {
    let server_name = server_name.to_ascii_lowercase();
    let admitted = match server_name.strip_prefix('*') {
        Some(suffix) if suffix.starts_with('.') => format!(
            r#"  local suffix = {suffix}
  if #host <= #suffix or string.sub(host, -#suffix) ~= suffix then
    return false
  end
  return not string.find(string.sub(host, 1, #host - #suffix), ".", 1, true)"#,
            suffix = lua_quote(suffix)
        ),
        _ => format!("  return host == {}", lua_quote(&server_name)),
    };
    format!(
        r#"local function admitted(host)
{admitted}
end

function envoy_on_request(request_handle)
  local authority = request_handle:headers():get(":authority") or ""
  local host = string.gsub(string.lower(authority), ":%d+$", "")
  if not admitted(host) then
    request_handle:respond(
      {{[":status"] = "421"}},
      string.format("misdirected request to %q", authority)
    )
  end
end
"#
    )
}

fn lua_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = r#"
local status = nil
local handle = {}
function handle:headers()
  return { get = function(_, name) if name == ":authority" then return AUTHORITY end end }
end
function handle:respond(headers, body)
  status = headers[":status"]
end
envoy_on_request(handle)
return status
"#;

    /// Runs the script for `server_name` against one request and returns the
    /// status it responded with, if any.
    fn respond(server_name: &str, authority: Option<&str>) -> Option<String> {
        let lua = mlua::Lua::new();
        lua.globals().set("AUTHORITY", authority).expect("set authority");
        lua.load(misdirected_request_script(server_name))
            .exec()
            .expect("script loads");
        lua.load(REQUEST).eval().expect("request handled")
    }

    #[test]
    fn admits_matching_authority() {
        assert_eq!(respond("www.example.com", Some("www.example.com")), None);
        assert_eq!(respond("www.example.com", Some("WWW.EXAMPLE.COM:8443")), None);
        assert_eq!(respond("www.example.com", Some("WWW.Example.COM")), None);
        assert_eq!(respond("WWW.EXAMPLE.COM", Some("www.example.com")), None);
    }

    #[test]
    fn rejects_other_hosts() {
        let misdirected = Some("421".to_string());
        assert_eq!(respond("www.example.com", Some("other.example.com")), misdirected);
        assert_eq!(respond("www.example.com", Some("www.example.com.evil")), misdirected);
        assert_eq!(respond("www.example.com", Some("www.example.com:")), misdirected);
        assert_eq!(respond("www.example.com", None), misdirected);
    }

    #[test]
    fn wildcard_admits_one_label() {
        assert_eq!(respond("*.example.com", Some("a.example.com")), None);
        assert_eq!(respond("*.example.com", Some("A.Example.com:443")), None);

        let misdirected = Some("421".to_string());
        assert_eq!(respond("*.example.com", Some("other.internal")), misdirected);
        assert_eq!(respond("*.example.com", Some("example.com")), misdirected);
        assert_eq!(respond("*.example.com", Some(".example.com")), misdirected);
        assert_eq!(respond("*.example.com", Some("a.b.example.com")), misdirected);
        assert_eq!(respond("*.example.com", Some("aexample.com")), misdirected);
    }

    #[test]
    fn server_name_is_quoted() {
        let script = misdirected_request_script(r#"a"b\c"#);
        assert!(script.contains(r#"host == "a\"b\\c""#));
        assert_eq!(respond(r#"a"b\c"#, Some(r#"a"b\c"#)), None);
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(lua_quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn filter_is_typed_lua() {
        let filter = misdirected_request_filter("www.example.com");
        assert_eq!(filter.name, wellknown::LUA);
        let any = filter.typed_config().expect("typed config");
        let lua: Lua = xds_types::unpack(any).expect("lua config");
        assert!(lua.inline_code.contains("envoy_on_request"));
    }
}
