//! Default app-inspection chains (spec.md §6), submitted via
//! `inventory::submit!` the way the teacher's `crates/registry` gates
//! its `*-builtins` features — each builtin describes itself in one
//! place, and `register_builtins` collects and registers every one of
//! them without a hand-maintained master list.

use warden_detect_types::{AlProto, Direction, IpProto};

use crate::app_inspection::{AppInspectionRegistry, InspectCallback, SmList};

/// One default registration, collected by [`inventory`] and applied by
/// [`register_builtins`].
pub struct Builtin {
    pub ipproto: IpProto,
    pub alproto: AlProto,
    pub direction: Direction,
    pub sm_list: i32,
    pub inspect_flags: u32,
    pub callback: InspectCallback,
}

inventory::collect!(Builtin);

/// `DE_STATE_FLAG_*`-equivalent bits: one per submatch list actually
/// wired up below, so two builtins never collide by accident.
mod flag {
    pub const URI: u32 = 1 << 0;
    pub const REQUEST_LINE: u32 = 1 << 1;
    pub const CLIENT_BODY: u32 = 1 << 2;
    pub const HEADERS: u32 = 1 << 3;
    pub const RAW_HEADERS: u32 = 1 << 4;
    pub const METHOD: u32 = 1 << 5;
    pub const COOKIE: u32 = 1 << 6;
    pub const RAW_URI: u32 = 1 << 7;
    pub const FILE_TS: u32 = 1 << 8;
    pub const FILE_TC: u32 = 1 << 9;
    pub const USER_AGENT: u32 = 1 << 10;
    pub const HOST_HEADER: u32 = 1 << 11;
    pub const RAW_HOST_HEADER: u32 = 1 << 12;
    pub const DNS_QUERY: u32 = 1 << 13;
    pub const FILEDATA_SMTP: u32 = 1 << 14;
    pub const MODBUS: u32 = 1 << 15;
    pub const SERVER_BODY: u32 = 1 << 16;
    pub const STAT_MSG: u32 = 1 << 17;
    pub const STAT_CODE: u32 = 1 << 18;
}

// The inspection routines themselves belong to the signature engine;
// these are stand-ins that only exist so the registry has a non-null
// `fn` to store and compare.
fn inspect_http_uri(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_request_line(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_client_body(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_headers(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_raw_headers(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_method(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_cookie(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_raw_uri(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_file_ts(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_file_tc(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_user_agent(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_host_header(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_raw_host_header(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_server_body(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_stat_msg(_tx_id: u64) -> i32 {
    0
}
fn inspect_http_stat_code(_tx_id: u64) -> i32 {
    0
}
fn inspect_dns_query_name(_tx_id: u64) -> i32 {
    0
}
fn inspect_smtp_file(_tx_id: u64) -> i32 {
    0
}
fn inspect_smtp_filedata(_tx_id: u64) -> i32 {
    0
}
fn inspect_modbus(_tx_id: u64) -> i32 {
    0
}

inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::Uri as i32, inspect_flags: flag::URI, callback: inspect_http_uri } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::RequestLine as i32, inspect_flags: flag::REQUEST_LINE, callback: inspect_http_request_line } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::ClientBody as i32, inspect_flags: flag::CLIENT_BODY, callback: inspect_http_client_body } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::Headers as i32, inspect_flags: flag::HEADERS, callback: inspect_http_headers } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::RawHeaders as i32, inspect_flags: flag::RAW_HEADERS, callback: inspect_http_raw_headers } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::Method as i32, inspect_flags: flag::METHOD, callback: inspect_http_method } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::Cookie as i32, inspect_flags: flag::COOKIE, callback: inspect_http_cookie } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::RawUri as i32, inspect_flags: flag::RAW_URI, callback: inspect_http_raw_uri } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::File as i32, inspect_flags: flag::FILE_TS, callback: inspect_http_file_ts } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::UserAgent as i32, inspect_flags: flag::USER_AGENT, callback: inspect_http_user_agent } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::HostHeader as i32, inspect_flags: flag::HOST_HEADER, callback: inspect_http_host_header } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToServer, sm_list: SmList::RawHostHeader as i32, inspect_flags: flag::RAW_HOST_HEADER, callback: inspect_http_raw_host_header } }

inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Dns, direction: Direction::ToServer, sm_list: SmList::DnsQueryName as i32, inspect_flags: flag::DNS_QUERY, callback: inspect_dns_query_name } }
inventory::submit! { Builtin { ipproto: IpProto::Udp, alproto: AlProto::Dns, direction: Direction::ToServer, sm_list: SmList::DnsQueryName as i32, inspect_flags: flag::DNS_QUERY, callback: inspect_dns_query_name } }

inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Smtp, direction: Direction::ToServer, sm_list: SmList::File as i32, inspect_flags: flag::FILE_TS, callback: inspect_smtp_file } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Smtp, direction: Direction::ToServer, sm_list: SmList::FileData as i32, inspect_flags: flag::FILEDATA_SMTP, callback: inspect_smtp_filedata } }

inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Modbus, direction: Direction::ToServer, sm_list: SmList::ModbusMatch as i32, inspect_flags: flag::MODBUS, callback: inspect_modbus } }

inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToClient, sm_list: SmList::FileData as i32, inspect_flags: flag::SERVER_BODY, callback: inspect_http_server_body } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToClient, sm_list: SmList::Headers as i32, inspect_flags: flag::HEADERS, callback: inspect_http_headers } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToClient, sm_list: SmList::RawHeaders as i32, inspect_flags: flag::RAW_HEADERS, callback: inspect_http_raw_headers } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToClient, sm_list: SmList::Cookie as i32, inspect_flags: flag::COOKIE, callback: inspect_http_cookie } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToClient, sm_list: SmList::File as i32, inspect_flags: flag::FILE_TC, callback: inspect_http_file_tc } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToClient, sm_list: SmList::StatMsg as i32, inspect_flags: flag::STAT_MSG, callback: inspect_http_stat_msg } }
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Http, direction: Direction::ToClient, sm_list: SmList::StatCode as i32, inspect_flags: flag::STAT_CODE, callback: inspect_http_stat_code } }

// Preserved bug (spec.md §9 open question a): this is authored as the
// to-client Modbus entry, but its `direction` is `ToServer` (0), the
// same as the real to-server Modbus registration above. Since its
// `sm_list` and `callback` are also identical to that entry, it lands
// in the `(Tcp, Modbus, ToServer)` chain as an idempotent no-op — there
// is no `(Tcp, Modbus, ToClient)` chain after `register_builtins`.
inventory::submit! { Builtin { ipproto: IpProto::Tcp, alproto: AlProto::Modbus, direction: Direction::ToServer, sm_list: SmList::ModbusMatch as i32, inspect_flags: flag::MODBUS, callback: inspect_modbus } }

/// Populates the default app-inspection chains listed in spec.md §6.
pub fn register_builtins(registry: &AppInspectionRegistry) {
    for builtin in inventory::iter::<Builtin> {
        registry.register(
            builtin.ipproto,
            builtin.alproto,
            builtin.direction,
            builtin.sm_list,
            builtin.inspect_flags,
            builtin.callback,
        );
    }
}
