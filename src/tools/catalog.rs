//! Static catalog of every tool the server exposes, in listing order.

use crate::core::tool::{
    Echo, Encoding, Fallback, FieldSpec, OneOf, OperationDescriptor, RecordKind, Route, Scope,
    Shape, Verb,
};

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const PAGE_SWEEP_TIMEOUT_SECS: u64 = 30;
pub const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Minimum trimmed length of a semantic member search query.
pub const MEMBER_QUERY_MIN_LEN: usize = 6;

const GROUP_QUERY: &[(&str, &str)] = &[("text_only", "1"), ("all_users", "1")];

const fn route(verb: Verb, path: &'static str, encoding: Encoding) -> Route {
    Route { verb, path, encoding, fixed_query: &[], timeout_secs: DEFAULT_TIMEOUT_SECS }
}

const fn with_timeout(r: Route, timeout_secs: u64) -> Route {
    Route { timeout_secs, ..r }
}

const fn with_query(r: Route, fixed_query: &'static [(&'static str, &'static str)]) -> Route {
    Route { fixed_query, ..r }
}

const SEARCH_ECHO: &[Echo] = &[Echo::Zero("total"), Echo::PageWindow, Echo::EmptyList("hits")];

pub static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "server_info",
        description: "获取 MCP 服务信息（健康检查）",
        fields: &[],
        one_of: None,
        record: RecordKind::Empty,
        route: None,
        scope: Scope::Public,
        shape: Shape::ServerInfo,
        failure_message: "Failed to read server info",
        echo: &[],
    },
    OperationDescriptor {
        name: "search_members",
        description: "搜索爱合伙平台上的创业者/会员。使用向量语义搜索，建议使用语义连贯的长句描述，避免简单关键词罗列",
        fields: &[
            FieldSpec::required("query", "语义搜索查询（长度必须大于5个字符，建议使用完整句子描述需求）")
                .min_len(MEMBER_QUERY_MIN_LEN),
            FieldSpec::paginate(),
        ],
        one_of: None,
        record: RecordKind::Search,
        route: Some(route(Verb::Get, "/users/search", Encoding::Json)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to search members",
        echo: SEARCH_ECHO,
    },
    OperationDescriptor {
        name: "search_ideas",
        description: "搜索爱合伙平台上的创业想法/项目。使用向量语义搜索，建议使用语义连贯的长句描述，避免简单关键词罗列",
        fields: &[
            FieldSpec::required("query", "语义搜索查询（建议使用完整句子描述需求）"),
            FieldSpec::paginate(),
        ],
        one_of: None,
        record: RecordKind::Search,
        route: Some(route(Verb::Get, "/ideas/search", Encoding::Json)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to search ideas",
        echo: SEARCH_ECHO,
    },
    OperationDescriptor {
        name: "get_group_info",
        description: "获取群组基本情况和群内所有成员数据",
        fields: &[FieldSpec::required("group_id", "群组ID")],
        one_of: None,
        record: RecordKind::Group,
        route: Some(with_query(route(Verb::Get, "/users/e{group_id}", Encoding::Bare), GROUP_QUERY)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to fetch group information",
        echo: &[Echo::Arg("group_id", Fallback::Unknown)],
    },
    OperationDescriptor {
        name: "export_group_transcript",
        description: "获取群组基本情况和全部成员数据，写入本地 Markdown 文件并返回文件路径（适用于成员较多的大群）",
        fields: &[FieldSpec::required("group_id", "群组ID")],
        one_of: None,
        record: RecordKind::Group,
        route: Some(with_timeout(
            with_query(route(Verb::Get, "/users/e{group_id}", Encoding::Bare), GROUP_QUERY),
            PAGE_SWEEP_TIMEOUT_SECS,
        )),
        scope: Scope::Public,
        shape: Shape::Transcript,
        failure_message: "Failed to export group transcript",
        echo: &[Echo::Arg("group_id", Fallback::Unknown)],
    },
    OperationDescriptor {
        name: "update_bio",
        description: "更新用户简介",
        fields: &[FieldSpec::required("bio", "用户简介")],
        one_of: None,
        record: RecordKind::Bio,
        route: Some(route(Verb::Put, "/users/update_bio", Encoding::Json)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to update user bio",
        echo: &[Echo::Arg("bio", Fallback::Empty)],
    },
    OperationDescriptor {
        name: "update_goal",
        description: "更新用户目标",
        fields: &[FieldSpec::required("goal", "用户目标")],
        one_of: None,
        record: RecordKind::Goal,
        route: Some(route(Verb::Put, "/users/update_goal", Encoding::Json)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to update user goal",
        echo: &[Echo::Arg("goal", Fallback::Empty)],
    },
    OperationDescriptor {
        name: "get_current_user_profile",
        description: "获取当前用户完整资料信息",
        fields: &[],
        one_of: None,
        record: RecordKind::Empty,
        route: Some(route(Verb::Get, "/users/{current_user}", Encoding::Bare)),
        scope: Scope::CurrentUser,
        shape: Shape::Verbatim,
        failure_message: "Failed to fetch current user profile",
        echo: &[Echo::CurrentUser],
    },
    OperationDescriptor {
        name: "get_current_user_ideas",
        description: "获取当前用户的创业想法/项目",
        fields: &[FieldSpec::paginate()],
        one_of: None,
        record: RecordKind::Page,
        route: Some(route(Verb::Get, "/ideas/my_ideas", Encoding::Json)),
        scope: Scope::CurrentUser,
        shape: Shape::Verbatim,
        failure_message: "Failed to fetch current user ideas",
        echo: &[Echo::CurrentUser],
    },
    OperationDescriptor {
        name: "get_idea_details",
        description: "获取指定想法/项目的详细信息",
        fields: &[FieldSpec::required("idea_id", "想法/项目ID")],
        one_of: None,
        record: RecordKind::Idea,
        route: Some(route(Verb::Get, "/ideas/{idea_id}", Encoding::Bare)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to fetch idea details",
        echo: &[Echo::Arg("idea_id", Fallback::Unknown)],
    },
    OperationDescriptor {
        name: "get_latest_ideas",
        description: "获取平台最新发布的创业想法/项目列表",
        fields: &[FieldSpec::paginate()],
        one_of: None,
        record: RecordKind::Page,
        route: Some(route(Verb::Get, "/ideas/latest", Encoding::Query)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to fetch latest ideas",
        echo: &[Echo::Zero("total"), Echo::PageWindow, Echo::EmptyList("ideas")],
    },
    OperationDescriptor {
        name: "fetch_new_users",
        description: "获取新用户列表，分页获取10页数据并合并",
        fields: &[],
        one_of: None,
        record: RecordKind::Empty,
        route: Some(with_timeout(
            route(Verb::Get, "/users/new_users", Encoding::Json),
            PAGE_SWEEP_TIMEOUT_SECS,
        )),
        scope: Scope::Public,
        shape: Shape::NewUsersSweep,
        failure_message: "Failed to fetch new users",
        echo: &[Echo::Zero("total_users"), Echo::EmptyList("users")],
    },
    OperationDescriptor {
        name: "get_user_details",
        description: "获取指定用户的详细信息",
        fields: &[FieldSpec::required("user_id", "用户ID")],
        one_of: None,
        record: RecordKind::User,
        route: Some(route(Verb::Get, "/users/{user_id}", Encoding::Bare)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to fetch user details",
        echo: &[Echo::Arg("user_id", Fallback::Unknown)],
    },
    OperationDescriptor {
        name: "submit_wechat_article_draft",
        description: "提交微信文章草稿。注意：文章正文不能包含超链接（<a>标签）",
        fields: &[
            FieldSpec::required("title", "文章标题"),
            FieldSpec::required("digest", "文章摘要"),
            FieldSpec::required(
                "body",
                "文章正文HTML内容（仅包含body标签内的内容，不包含<body>标签本身，不能包含超链接<a>标签）",
            ),
        ],
        one_of: None,
        record: RecordKind::Article,
        route: Some(route(Verb::Post, "/articles/draft_wechat_article", Encoding::Json)),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to submit WeChat article draft",
        echo: &[Echo::Arg("title", Fallback::Empty)],
    },
    OperationDescriptor {
        name: "create_ai_report",
        description: "创建AI生成的报告并在官网展示。与微信文章不同，报告可以包含超链接，并可以关联提及的用户和项目。正文较大时可用 html_file_path 指定本地HTML文件代替 html_body",
        fields: &[
            FieldSpec::required("title", "报告标题"),
            FieldSpec::required("abstract", "报告摘要/简介"),
            FieldSpec::optional("html_body", "报告正文HTML内容（可以包含超链接）"),
            FieldSpec::optional("html_file_path", "本地HTML文件路径，内容较大时代替 html_body 上传"),
            FieldSpec::list("mentioned_user_ids", "报告中提及的用户ID列表（ID字符串，不是number）"),
            FieldSpec::list("mentioned_idea_ids", "报告中提及的项目/想法ID列表"),
        ],
        one_of: Some(OneOf { first: "html_body", second: "html_file_path" }),
        record: RecordKind::Report,
        route: Some(with_timeout(
            route(Verb::Post, "/ai_reports", Encoding::JsonOrMultipart),
            UPLOAD_TIMEOUT_SECS,
        )),
        scope: Scope::Public,
        shape: Shape::Verbatim,
        failure_message: "Failed to create AI report",
        echo: &[Echo::Arg("title", Fallback::Empty)],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = OPERATIONS.iter().map(|o| o.name).collect();
        assert_eq!(names.len(), OPERATIONS.len());
    }

    #[test]
    fn every_routed_path_placeholder_is_known() {
        for op in OPERATIONS {
            let Some(route) = op.route else { continue };
            for part in route.path.split('{').skip(1) {
                let var = part.split('}').next().unwrap();
                assert!(
                    var == "current_user" || op.field(var).is_some(),
                    "{}: unknown placeholder {var}",
                    op.name
                );
            }
        }
    }

    #[test]
    fn current_user_operations_echo_the_user() {
        for op in OPERATIONS.iter().filter(|o| o.scope == Scope::CurrentUser) {
            assert!(op.echo.contains(&Echo::CurrentUser), "{}", op.name);
        }
    }

    #[test]
    fn only_the_report_accepts_a_file_upload() {
        let uploads: Vec<_> = OPERATIONS
            .iter()
            .filter(|o| o.route.map(|r| r.encoding) == Some(Encoding::JsonOrMultipart))
            .map(|o| o.name)
            .collect();
        assert_eq!(uploads, vec!["create_ai_report"]);
    }
}
