// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Action descriptor table
//!
//! Every logical backend action is described once: its logical parameters,
//! the name each parameter takes on either transport, the local host
//! operation and the remote route. Dispatch is driven entirely by this table.

use std::fmt;

/// A logical backend action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CoreVersion,
    AiAdd,
    AiDelete,
    AiList,
    AiRename,
    Chat,
    ChatAbort,
    ChatClear,
    ChatDelete,
    ChatHistory,
    DocCountPart,
    DocDelete,
    DocGetPart,
    DocLearn,
    DocList,
    DocListByIds,
    DocListDigestingIds,
    LlmActive,
    LlmConfig,
    LlmDelete,
    LlmEdit,
    LlmList,
    LlmListActivedNames,
    LlmTestChat,
    MemStats,
    MemVacuum,
    SkillAdd,
    SkillAdds,
    SkillDelete,
    SkillList,
    ToolDeleteByToolset,
    ToolGet,
    ToolImport,
    ToolListByIds,
    ToolListToolsets,
    ToolParse,
    ToolQueryByToolset,
    ConfigGet,
    ConfigSet,
    AppConfig,
    AppGetRemoteUrl,
    AppGetRemoteToken,
    AppSetRemote,
    IsNpxInstalled,
    IsUvInstalled,
}

impl Action {
    /// All actions, in table order.
    pub const ALL: [Action; 45] = [
        Action::CoreVersion,
        Action::AiAdd,
        Action::AiDelete,
        Action::AiList,
        Action::AiRename,
        Action::Chat,
        Action::ChatAbort,
        Action::ChatClear,
        Action::ChatDelete,
        Action::ChatHistory,
        Action::DocCountPart,
        Action::DocDelete,
        Action::DocGetPart,
        Action::DocLearn,
        Action::DocList,
        Action::DocListByIds,
        Action::DocListDigestingIds,
        Action::LlmActive,
        Action::LlmConfig,
        Action::LlmDelete,
        Action::LlmEdit,
        Action::LlmList,
        Action::LlmListActivedNames,
        Action::LlmTestChat,
        Action::MemStats,
        Action::MemVacuum,
        Action::SkillAdd,
        Action::SkillAdds,
        Action::SkillDelete,
        Action::SkillList,
        Action::ToolDeleteByToolset,
        Action::ToolGet,
        Action::ToolImport,
        Action::ToolListByIds,
        Action::ToolListToolsets,
        Action::ToolParse,
        Action::ToolQueryByToolset,
        Action::ConfigGet,
        Action::ConfigSet,
        Action::AppConfig,
        Action::AppGetRemoteUrl,
        Action::AppGetRemoteToken,
        Action::AppSetRemote,
        Action::IsNpxInstalled,
        Action::IsUvInstalled,
    ];

    /// The descriptor for this action.
    pub fn descriptor(self) -> &'static ActionDescriptor {
        &ACTIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn is_streaming(self) -> bool {
        self.descriptor().mode == CallMode::Streaming
    }

    /// Look an action up by its logical name (e.g. `ai_rename`).
    pub fn from_name(name: &str) -> Option<Action> {
        ACTIONS.iter().find(|d| d.name == name).map(|d| d.action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a parameter is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A JSON value
    Value,
    /// Uploaded file content; the file name travels in a sibling field
    File {
        local_name_field: &'static str,
        remote_name_field: &'static str,
    },
}

/// One logical parameter and its per-transport field names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Logical name (snake_case), used as the key in [`Args`](super::Args)
    pub name: &'static str,
    /// Argument name for the local host (camelCase)
    pub local: &'static str,
    /// Field name in the remote request (snake_case)
    pub remote: &'static str,
    pub kind: ParamKind,
}

/// HTTP request shape for a remote route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET with parameters as query string
    Get,
    /// POST with a JSON body
    Post,
    /// POST with a multipart form
    Multipart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    /// Path below the API root, e.g. `/ai/rename`
    pub path: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Unary,
    Streaming,
}

/// Static description of a logical action
#[derive(Debug, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub action: Action,
    pub name: &'static str,
    pub params: &'static [Param],
    /// Host operation; `None` if the action has no local counterpart
    pub local_op: Option<&'static str>,
    /// Remote route; `None` if the action only exists on the local host
    pub remote: Option<Route>,
    pub mode: CallMode,
}

impl ActionDescriptor {
    pub fn param(&self, name: &str) -> Option<&'static Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn is_streaming(&self) -> bool {
        self.mode == CallMode::Streaming
    }
}

const fn p(name: &'static str, local: &'static str, remote: &'static str) -> Param {
    Param {
        name,
        local,
        remote,
        kind: ParamKind::Value,
    }
}

/// Same name on every transport.
const fn same(name: &'static str) -> Param {
    p(name, name, name)
}

const fn get(path: &'static str) -> Option<Route> {
    Some(Route {
        method: Method::Get,
        path,
    })
}

const fn post(path: &'static str) -> Option<Route> {
    Some(Route {
        method: Method::Post,
        path,
    })
}

const fn multipart(path: &'static str) -> Option<Route> {
    Some(Route {
        method: Method::Multipart,
        path,
    })
}

macro_rules! descriptor {
    ($action:ident, [$($param:expr),* $(,)?], $local:expr, $remote:expr) => {
        descriptor!(@ $action, [$($param),*], $local, $remote, Unary)
    };
    (stream $action:ident, [$($param:expr),* $(,)?], $local:expr, $remote:expr) => {
        descriptor!(@ $action, [$($param),*], $local, $remote, Streaming)
    };
    (@ $action:ident, [$($param:expr),*], $local:expr, $remote:expr, $mode:ident) => {
        ActionDescriptor {
            action: Action::$action,
            name: $local,
            params: &[$($param),*],
            local_op: Some($local),
            remote: $remote,
            mode: CallMode::$mode,
        }
    };
}

const AI: Param = same("ai");
const ID: Param = same("id");
const NAME: Param = same("name");
const SESSION: Param = same("session");
const EXCHANGE: Param = same("exchange");
const IDS: Param = same("ids");
const SEARCH: Param = same("search");
const LIMIT: Param = same("limit");
const OFFSET: Param = same("offset");
const TYPE: Param = same("type");
const PROTOCOL: Param = same("protocol");
const OPTIONS: Param = same("options");
const TOOLSET_ID: Param = p("toolset_id", "toolsetId", "toolset_id");

const DOC_FILE: Param = Param {
    name: "file",
    local: "fileData",
    remote: "file",
    kind: ParamKind::File {
        local_name_field: "fileName",
        remote_name_field: "filename",
    },
};

/// The table, indexed by `Action as usize`. Logical names equal local operation names.
pub static ACTIONS: [ActionDescriptor; 45] = [
    descriptor!(CoreVersion, [], "core_version", get("/version")),
    descriptor!(AiAdd, [NAME], "ai_add", post("/ai/add")),
    descriptor!(AiDelete, [NAME], "ai_delete", post("/ai/delete")),
    descriptor!(AiList, [], "ai_list", post("/ai/list")),
    descriptor!(
        AiRename,
        [NAME, p("new_name", "newName", "new_name")],
        "ai_rename",
        post("/ai/rename")
    ),
    descriptor!(
        stream Chat,
        [
            AI,
            same("message"),
            EXCHANGE,
            SESSION,
            p("llm_for_chat", "llmForChat", "llm_for_chat"),
            p("llm_for_reasoning", "llmForReasoning", "llm_for_reasoning"),
            p("llm_options", "llmOptions", "llm_options"),
            same("deep"),
            same("retrace"),
            same("strict"),
        ],
        "chat",
        post("/chat/")
    ),
    // Remote chats are aborted by closing the connection.
    descriptor!(ChatAbort, [AI, SESSION, EXCHANGE], "chat_abort", None),
    descriptor!(ChatClear, [AI, SESSION], "chat_clear", post("/chat/clear")),
    descriptor!(
        ChatDelete,
        [AI, SESSION, EXCHANGE],
        "chat_delete",
        post("/chat/delete")
    ),
    descriptor!(
        ChatHistory,
        [AI, SESSION],
        "chat_history",
        post("/chat/history")
    ),
    descriptor!(
        DocCountPart,
        [AI, ID],
        "doc_count_part",
        post("/doc/count-part")
    ),
    descriptor!(DocDelete, [AI, ID], "doc_delete", post("/doc/delete")),
    descriptor!(
        DocGetPart,
        [AI, ID, same("index")],
        "doc_get_part",
        post("/doc/get-part")
    ),
    descriptor!(DocLearn, [AI, DOC_FILE], "doc_learn", multipart("/doc/learn")),
    descriptor!(
        DocList,
        [AI, SEARCH, LIMIT, OFFSET],
        "doc_list",
        post("/doc/list")
    ),
    descriptor!(
        DocListByIds,
        [AI, IDS],
        "doc_list_by_ids",
        post("/doc/list-by-ids")
    ),
    descriptor!(
        DocListDigestingIds,
        [AI, LIMIT],
        "doc_list_digesting_ids",
        post("/doc/list-digesting-ids")
    ),
    descriptor!(LlmActive, [TYPE, NAME], "llm_active", post("/llm/active")),
    descriptor!(
        LlmConfig,
        [NAME, TYPE, PROTOCOL, OPTIONS],
        "llm_config",
        post("/llm/config")
    ),
    descriptor!(LlmDelete, [NAME], "llm_delete", post("/llm/delete")),
    descriptor!(
        LlmEdit,
        [p("old_name", "oldName", "old_name"), NAME, PROTOCOL, OPTIONS],
        "llm_edit",
        post("/llm/edit")
    ),
    descriptor!(LlmList, [], "llm_list", post("/llm/list")),
    descriptor!(
        LlmListActivedNames,
        [],
        "llm_list_actived_names",
        post("/llm/list-actived-names")
    ),
    descriptor!(
        stream LlmTestChat,
        [
            same("prompt"),
            NAME,
            PROTOCOL,
            OPTIONS,
            p("timeout_secs", "timeoutSecs", "timeout_secs"),
        ],
        "llm_test_chat",
        post("/llm/test-chat")
    ),
    descriptor!(MemStats, [AI], "mem_stats", post("/mem/stats")),
    descriptor!(MemVacuum, [AI], "mem_vacuum", post("/mem/vacuum")),
    descriptor!(
        SkillAdd,
        [AI, p("tool_id", "toolId", "tool_id"), same("trigger")],
        "skill_add",
        post("/skill/add")
    ),
    descriptor!(SkillAdds, [AI, TOOLSET_ID], "skill_adds", post("/skill/adds")),
    descriptor!(SkillDelete, [AI, ID], "skill_delete", post("/skill/delete")),
    descriptor!(
        SkillList,
        [AI, SEARCH, LIMIT, OFFSET],
        "skill_list",
        post("/skill/list")
    ),
    descriptor!(
        ToolDeleteByToolset,
        [TOOLSET_ID],
        "tool_delete_by_toolset",
        post("/tool/delete-by-toolset")
    ),
    descriptor!(ToolGet, [ID], "tool_get", post("/tool/get")),
    descriptor!(
        ToolImport,
        [TYPE, same("title"), OPTIONS],
        "tool_import",
        post("/tool/import")
    ),
    descriptor!(
        ToolListByIds,
        [IDS],
        "tool_list_by_ids",
        post("/tool/list-by-ids")
    ),
    descriptor!(
        ToolListToolsets,
        [],
        "tool_list_toolsets",
        post("/tool/list-toolsets")
    ),
    descriptor!(ToolParse, [TYPE, OPTIONS], "tool_parse", post("/tool/parse")),
    descriptor!(
        ToolQueryByToolset,
        [TOOLSET_ID],
        "tool_query_by_toolset",
        post("/tool/query-by-toolset")
    ),
    descriptor!(ConfigGet, [same("key")], "config_get", None),
    descriptor!(ConfigSet, [same("key"), same("value")], "config_set", None),
    descriptor!(AppConfig, [], "app_config", None),
    descriptor!(AppGetRemoteUrl, [], "app_get_remote_url", None),
    descriptor!(AppGetRemoteToken, [], "app_get_remote_token", None),
    descriptor!(
        AppSetRemote,
        [same("url"), same("token")],
        "app_set_remote",
        None
    ),
    descriptor!(IsNpxInstalled, [], "is_npx_installed", None),
    descriptor!(IsUvInstalled, [], "is_uv_installed", None),
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn to_camel(name: &str) -> String {
        let mut out = String::new();
        let mut upper = false;
        for c in name.chars() {
            if c == '_' {
                upper = true;
            } else if upper {
                out.push(c.to_ascii_uppercase());
                upper = false;
            } else {
                out.push(c);
            }
        }
        out
    }

    // ===== Table Integrity Tests =====

    #[test]
    fn test_table_order_matches_enum() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(ACTIONS[i].action, *action, "row {} out of order", i);
            assert_eq!(action.descriptor().action, *action);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = ACTIONS.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ACTIONS.len());
    }

    #[test]
    fn test_every_action_has_a_route() {
        for desc in ACTIONS.iter() {
            assert!(
                desc.local_op.is_some() || desc.remote.is_some(),
                "{} is unreachable",
                desc.name
            );
        }
    }

    #[test]
    fn test_local_names_are_camel_case_of_logical() {
        for desc in ACTIONS.iter() {
            for param in desc.params {
                if matches!(param.kind, ParamKind::Value) {
                    assert_eq!(param.local, to_camel(param.name), "{}.{}", desc.name, param.name);
                }
            }
        }
    }

    #[test]
    fn test_remote_names_are_snake_case() {
        for desc in ACTIONS.iter() {
            for param in desc.params {
                if matches!(param.kind, ParamKind::Value) {
                    assert_eq!(param.remote, param.name, "{}.{}", desc.name, param.name);
                }
            }
        }
    }

    #[test]
    fn test_streaming_actions() {
        let streaming: Vec<_> = Action::ALL.iter().filter(|a| a.is_streaming()).collect();
        assert_eq!(streaming, vec![&Action::Chat, &Action::LlmTestChat]);
        assert_eq!(Action::Chat.descriptor().remote.unwrap().path, "/chat/");
    }

    #[test]
    fn test_version_is_the_only_get() {
        for desc in ACTIONS.iter() {
            if let Some(route) = desc.remote {
                assert_eq!(
                    route.method == Method::Get,
                    desc.action == Action::CoreVersion,
                    "{}",
                    desc.name
                );
            }
        }
    }

    #[test]
    fn test_doc_learn_is_multipart() {
        let desc = Action::DocLearn.descriptor();
        assert_eq!(desc.remote.unwrap().method, Method::Multipart);
        assert!(matches!(
            desc.param("file").unwrap().kind,
            ParamKind::File { .. }
        ));
    }

    #[test]
    fn test_local_only_actions() {
        for action in [
            Action::ChatAbort,
            Action::ConfigGet,
            Action::AppConfig,
            Action::AppSetRemote,
        ] {
            assert!(action.descriptor().remote.is_none());
            assert!(action.descriptor().local_op.is_some());
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Action::from_name("ai_rename"), Some(Action::AiRename));
        assert_eq!(Action::from_name("nope"), None);
        assert_eq!(Action::AiRename.to_string(), "ai_rename");
    }

    proptest! {
        #[test]
        fn prop_from_name_inverts_name(index in 0usize..45) {
            let action = Action::ALL[index];
            prop_assert_eq!(Action::from_name(action.name()), Some(action));
        }
    }
}
