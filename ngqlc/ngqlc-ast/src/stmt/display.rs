//! Prints sentences back to parseable NGQL; re-parsing the text yields an
//! equal tree, modulo whitespace. Passwords are masked.

use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use super::*;

impl Display for Sentence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

fn opt<T: Display>(f: &mut Formatter<'_>, prefix: &str, v: &Option<T>) -> fmt::Result {
    if let Some(v) = v {
        write!(f, "{prefix}{v}")?;
    }
    Ok(())
}

impl Display for SentenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use SentenceKind::*;
        match self {
            Go(go) => {
                write!(f, "GO {} FROM {} {}", go.step, go.from, go.over)?;
                opt(f, " ", &go.where_clause)?;
                opt(f, " ", &go.yield_clause)?;
                opt(f, " | ", &go.truncate)
            }
            Lookup(lookup) => {
                write!(f, "LOOKUP ON {}", lookup.source)?;
                opt(f, " ", &lookup.where_clause)?;
                opt(f, " ", &lookup.yield_clause)
            }
            FetchVertices(fetch) => {
                write!(f, "FETCH PROP ON ")?;
                if fetch.tags.is_empty() {
                    write!(f, "*")?;
                } else {
                    write!(f, "{}", fetch.tags.iter().join(","))?;
                }
                write!(f, " {}", fetch.vertices)?;
                opt(f, " ", &fetch.yield_clause)
            }
            FetchEdges(fetch) => {
                write!(f, "FETCH PROP ON {} ", fetch.edge)?;
                if let Some(r) = &fetch.ref_expr {
                    write!(f, "{r}")?;
                } else {
                    for (i, k) in fetch.keys.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}->{}@{}", k.src, k.dst, k.rank)?;
                    }
                }
                opt(f, " ", &fetch.yield_clause)
            }
            FindPath(fp) => {
                write!(f, "FIND ")?;
                match fp.path_type {
                    FindPathType::Shortest => write!(f, "SHORTEST")?,
                    FindPathType::AllPath => write!(f, "ALL")?,
                    FindPathType::NoLoop => write!(f, "NOLOOP")?,
                }
                write!(f, " PATH ")?;
                if fp.with_prop {
                    write!(f, "WITH PROP ")?;
                }
                write!(f, "FROM {} TO {} {}", fp.from, fp.to, fp.over)?;
                opt(f, " ", &fp.where_clause)?;
                write!(f, " UPTO {} STEPS", fp.step.max_steps())?;
                opt(f, " ", &fp.yield_clause)
            }
            GetSubgraph(gs) => {
                write!(f, "GET SUBGRAPH ")?;
                if gs.with_prop {
                    write!(f, "WITH PROP ")?;
                }
                write!(f, "{} FROM {}", gs.step, gs.from)?;
                if !gs.in_edges.is_empty() {
                    write!(f, " IN {}", gs.in_edges.iter().join(","))?;
                }
                if !gs.out_edges.is_empty() {
                    write!(f, " OUT {}", gs.out_edges.iter().join(","))?;
                }
                if !gs.both_edges.is_empty() {
                    write!(f, " BOTH {}", gs.both_edges.iter().join(","))?;
                }
                opt(f, " ", &gs.yield_clause)
            }
            Match(m) => {
                write!(f, "MATCH ")?;
                for (i, p) in m.paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                opt(f, " ", &m.where_clause)?;
                write!(f, " {}", m.ret)
            }
            OrderBy(ob) => {
                write!(f, "ORDER BY {}", ob.factors.iter().join(","))
            }
            Limit(l) => {
                if l.offset != 0 {
                    write!(f, "LIMIT {},{}", l.offset, l.count)
                } else {
                    write!(f, "LIMIT {}", l.count)
                }
            }
            Yield(y) => {
                write!(f, "{}", y.yield_clause)?;
                opt(f, " ", &y.where_clause)
            }
            GroupBy(g) => write!(f, "{} {}", g.group_clause, g.yield_clause),
            Set(s) => {
                let op = match s.op {
                    SetOperator::Union => "UNION",
                    SetOperator::UnionAll => "UNION ALL",
                    SetOperator::Intersect => "INTERSECT",
                    SetOperator::Minus => "MINUS",
                };
                write!(f, "{} {op} {}", s.left, s.right)
            }
            Pipe(p) => write!(f, "{} | {}", p.left, p.right),
            Assignment(a) => write!(f, "${} = {}", a.var, a.body),
            Use(u) => write!(f, "USE {}", u.space),

            CreateSpace(cs) => {
                write!(f, "CREATE SPACE ")?;
                if cs.if_not_exists {
                    write!(f, "IF NOT EXISTS ")?;
                }
                write!(f, "{}", cs.name)?;
                if !cs.options.is_empty() {
                    write!(f, " ({})", cs.options.iter().join(", "))?;
                }
                if let Some(comment) = &cs.comment {
                    write!(f, " comment = \"{comment}\"")?;
                }
                Ok(())
            }
            CreateSpaceAs(cs) => {
                write!(f, "CREATE SPACE ")?;
                if cs.if_not_exists {
                    write!(f, "IF NOT EXISTS ")?;
                }
                write!(f, "{} AS {}", cs.new_name, cs.old_name)
            }
            AlterSpace(a) => {
                write!(f, "ALTER SPACE {} {} {}", a.name, a.op, a.args.iter().join(","))
            }
            DropSpace(d) => drop_like(f, "DROP SPACE", d),
            ClearSpace(d) => drop_like(f, "CLEAR SPACE", d),
            DescribeSpace(d) => write!(f, "DESCRIBE SPACE {}", d.name),
            ShowSpaces => write!(f, "SHOW SPACES"),
            ShowCreateSpace(d) => write!(f, "SHOW CREATE SPACE {}", d.name),

            CreateTag(c) => create_schema(f, "TAG", &c.name, &c.columns, &c.props, c.if_not_exists),
            CreateEdge(c) => {
                create_schema(f, "EDGE", &c.name, &c.columns, &c.props, c.if_not_exists)
            }
            AlterTag(a) => alter_schema(f, "TAG", &a.name, &a.opts, &a.props),
            AlterEdge(a) => alter_schema(f, "EDGE", &a.name, &a.opts, &a.props),
            DropTag(d) => drop_like(f, "DROP TAG", d),
            DropEdge(d) => drop_like(f, "DROP EDGE", d),
            DescribeTag(d) => write!(f, "DESCRIBE TAG {}", d.name),
            DescribeEdge(d) => write!(f, "DESCRIBE EDGE {}", d.name),
            ShowTags => write!(f, "SHOW TAGS"),
            ShowEdges => write!(f, "SHOW EDGES"),
            ShowCreateTag(d) => write!(f, "SHOW CREATE TAG {}", d.name),
            ShowCreateEdge(d) => write!(f, "SHOW CREATE EDGE {}", d.name),

            CreateTagIndex(c) | CreateEdgeIndex(c) => {
                write!(
                    f,
                    "CREATE {} INDEX ",
                    if c.is_edge { "EDGE" } else { "TAG" }
                )?;
                if c.if_not_exists {
                    write!(f, "IF NOT EXISTS ")?;
                }
                write!(
                    f,
                    "{} ON {}({})",
                    c.index_name,
                    c.schema_name,
                    c.fields.iter().join(",")
                )?;
                if let Some(comment) = &c.comment {
                    write!(f, " comment = \"{comment}\"")?;
                }
                Ok(())
            }
            DropTagIndex(d) | DropEdgeIndex(d) => {
                write!(f, "DROP {} INDEX ", if d.is_edge { "EDGE" } else { "TAG" })?;
                if d.if_exists {
                    write!(f, "IF EXISTS ")?;
                }
                write!(f, "{}", d.index_name)
            }
            DescribeTagIndex(d) | DescribeEdgeIndex(d) => {
                write!(
                    f,
                    "DESCRIBE {} INDEX {}",
                    if d.is_edge { "EDGE" } else { "TAG" },
                    d.index_name
                )
            }
            ShowCreateTagIndex(d) | ShowCreateEdgeIndex(d) => {
                write!(
                    f,
                    "SHOW CREATE {} INDEX {}",
                    if d.is_edge { "EDGE" } else { "TAG" },
                    d.index_name
                )
            }
            ShowTagIndexes => write!(f, "SHOW TAG INDEXES"),
            ShowEdgeIndexes => write!(f, "SHOW EDGE INDEXES"),
            ShowTagIndexStatus => write!(f, "SHOW TAG INDEX STATUS"),
            ShowEdgeIndexStatus => write!(f, "SHOW EDGE INDEX STATUS"),
            RebuildTagIndex(r) | RebuildEdgeIndex(r) => {
                write!(
                    f,
                    "REBUILD {} INDEX {}",
                    if r.is_edge { "EDGE" } else { "TAG" },
                    r.index_name
                )
            }
            CreateFulltextIndex(c) => {
                write!(
                    f,
                    "CREATE FULLTEXT {} INDEX {} ON {}({})",
                    if c.is_edge { "EDGE" } else { "TAG" },
                    c.index_name,
                    c.schema_name,
                    c.fields.iter().join(",")
                )
            }
            DropFulltextIndex(d) => write!(f, "DROP FULLTEXT INDEX {}", d.index_name),
            ShowFulltextIndexes => write!(f, "SHOW FULLTEXT INDEXES"),
            RebuildFulltextIndex => write!(f, "REBUILD FULLTEXT INDEX"),

            InsertVertices(iv) => {
                write!(f, "INSERT VERTEX ")?;
                if iv.if_not_exists {
                    write!(f, "IF NOT EXISTS ")?;
                }
                for (i, item) in iv.tag_items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}({})", item.tag, item.props.iter().join(","))?;
                }
                write!(f, " VALUES ")?;
                for (i, row) in iv.rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:({})", row.vid, row.values.iter().join(","))?;
                }
                Ok(())
            }
            InsertEdges(ie) => {
                write!(f, "INSERT EDGE ")?;
                if ie.if_not_exists {
                    write!(f, "IF NOT EXISTS ")?;
                }
                write!(f, "{}({}) VALUES ", ie.edge, ie.props.iter().join(","))?;
                for (i, row) in ie.rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(
                        f,
                        "{}->{}@{}:({})",
                        row.src,
                        row.dst,
                        row.rank,
                        row.values.iter().join(",")
                    )?;
                }
                Ok(())
            }
            UpdateVertex(uv) => {
                write!(f, "{} VERTEX", if uv.insertable { "UPSERT" } else { "UPDATE" })?;
                if let Some(tag) = &uv.tag {
                    write!(f, " ON {tag}")?;
                }
                write!(f, " {} SET ", uv.vid)?;
                write_update_items(f, &uv.items)?;
                opt(f, " ", &uv.when_clause)?;
                opt(f, " ", &uv.yield_clause)
            }
            UpdateEdge(ue) => {
                write!(
                    f,
                    "{} EDGE ON {} {}->{}@{} SET ",
                    if ue.insertable { "UPSERT" } else { "UPDATE" },
                    ue.edge,
                    ue.src,
                    ue.dst,
                    ue.rank
                )?;
                write_update_items(f, &ue.items)?;
                opt(f, " ", &ue.when_clause)?;
                opt(f, " ", &ue.yield_clause)
            }
            DeleteVertices(dv) => {
                write!(f, "DELETE VERTEX {}", dv.vertices)?;
                if dv.with_edge {
                    write!(f, " WITH EDGE")?;
                }
                Ok(())
            }
            DeleteTags(dt) => {
                write!(f, "DELETE TAG ")?;
                if dt.tags.is_empty() {
                    write!(f, "*")?;
                } else {
                    write!(f, "{}", dt.tags.iter().join(","))?;
                }
                write!(f, " FROM {}", dt.vertices)
            }
            DeleteEdges(de) => {
                write!(f, "DELETE EDGE {} ", de.edge)?;
                if let Some(r) = &de.ref_expr {
                    write!(f, "{r}")
                } else {
                    for (i, k) in de.keys.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}->{}@{}", k.src, k.dst, k.rank)?;
                    }
                    Ok(())
                }
            }
            Download(d) => write!(f, "DOWNLOAD HDFS \"{}\"", d.url),
            Ingest => write!(f, "INGEST"),

            AddHosts(a) => write!(f, "ADD HOSTS {}", a.hosts.iter().join(",")),
            DropHosts(d) => write!(f, "DROP HOSTS {}", d.hosts.iter().join(",")),
            ShowHosts(s) => {
                write!(f, "SHOW HOSTS")?;
                opt(f, " ", &s.role)
            }
            ShowParts(s) => {
                write!(f, "SHOW PARTS")?;
                if !s.parts.is_empty() {
                    write!(f, " {}", s.parts.iter().join(","))?;
                }
                Ok(())
            }
            ShowConfigs(s) => write!(f, "SHOW CONFIGS {}", s.module),
            SetConfig(s) => {
                write!(f, "UPDATE CONFIGS {}:{}", s.item.module, s.item.name)?;
                opt(f, " = ", &s.item.value)
            }
            GetConfig(g) => write!(f, "GET CONFIGS {}:{}", g.item.module, g.item.name),
            CreateSnapshot => write!(f, "CREATE SNAPSHOT"),
            DropSnapshot(d) => write!(f, "DROP SNAPSHOT {}", d.name),
            ShowSnapshots => write!(f, "SHOW SNAPSHOTS"),
            MergeZone(m) => {
                write!(
                    f,
                    "MERGE ZONE {} INTO {}",
                    m.zones.iter().join(","),
                    m.into_zone
                )
            }
            DropZone(d) => write!(f, "DROP ZONE {}", d.name),
            DivideZone(d) => {
                write!(f, "DIVIDE ZONE {} INTO", d.name)?;
                for (zone, hosts) in &d.parts {
                    write!(f, " {zone}({})", hosts.iter().join(","))?;
                }
                Ok(())
            }
            RenameZone(r) => write!(f, "RENAME ZONE {} TO {}", r.from, r.to),
            DescribeZone(d) => write!(f, "DESCRIBE ZONE {}", d.name),
            ShowZones => write!(f, "SHOW ZONES"),
            AddHostsIntoZone(a) => {
                write!(f, "ADD HOSTS {} INTO ", a.hosts.iter().join(","))?;
                if a.is_new {
                    write!(f, "NEW ")?;
                }
                write!(f, "ZONE {}", a.zone)
            }
            AddListener(a) => {
                write!(f, "ADD LISTENER {} {}", a.kind, a.hosts.iter().join(","))
            }
            RemoveListener(r) => write!(f, "REMOVE LISTENER {}", r.kind),
            ShowListener => write!(f, "SHOW LISTENER"),
            SignInService(s) => {
                write!(f, "SIGN IN {} SERVICE (", s.kind)?;
                for (i, c) in s.clients.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", c.host)?;
                    if let Some(user) = &c.user {
                        write!(f, ", \"{user}\"")?;
                    }
                    if c.password.is_some() {
                        write!(f, ", \"***\"")?;
                    }
                }
                write!(f, ")")
            }
            SignOutService(s) => write!(f, "SIGN OUT {} SERVICE", s.kind),
            ShowServiceClients(s) => write!(f, "SHOW {} CLIENTS", s.kind),
            AdminJob(j) => {
                write!(f, "{}", j.op)?;
                if let Some(cmd) = &j.cmd {
                    write!(f, " {cmd}")?;
                }
                if !j.args.is_empty() {
                    write!(f, " {}", j.args.iter().join(" "))?;
                }
                Ok(())
            }
            BalanceDisk(b) => {
                write!(f, "SUBMIT JOB BALANCE DISK")?;
                if b.remove {
                    write!(f, " REMOVE")?;
                }
                if !b.paths.is_empty() {
                    write!(f, " {}", b.paths.iter().map(|p| format!("\"{p}\"")).join(","))?;
                }
                Ok(())
            }
            ShowStats => write!(f, "SHOW STATS"),
            ShowCharset => write!(f, "SHOW CHARSET"),
            ShowCollation => write!(f, "SHOW COLLATION"),
            ShowMetaLeader => write!(f, "SHOW META LEADER"),

            ShowSessions(s) => {
                if let Some(id) = s.session_id {
                    write!(f, "SHOW SESSION {id}")
                } else if s.local {
                    write!(f, "SHOW LOCAL SESSIONS")
                } else {
                    write!(f, "SHOW SESSIONS")
                }
            }
            KillSession(k) => write!(f, "KILL SESSION {}", k.session_id),
            ShowQueries(s) => {
                if s.all {
                    write!(f, "SHOW ALL QUERIES")
                } else {
                    write!(f, "SHOW LOCAL QUERIES")
                }
            }
            KillQuery(k) => {
                write!(f, "KILL QUERY (")?;
                if let Some(session) = &k.session_id {
                    write!(f, "session={session}, ")?;
                }
                write!(f, "plan={})", k.plan_id)
            }

            CreateUser(c) => {
                write!(f, "CREATE USER ")?;
                if c.if_not_exists {
                    write!(f, "IF NOT EXISTS ")?;
                }
                write!(f, "{} WITH PASSWORD \"***\"", c.account)
            }
            DropUser(d) => {
                write!(f, "DROP USER ")?;
                if d.if_exists {
                    write!(f, "IF EXISTS ")?;
                }
                write!(f, "{}", d.account)
            }
            AlterUser(a) => write!(f, "ALTER USER {} WITH PASSWORD \"***\"", a.account),
            ChangePassword(c) => write!(f, "CHANGE PASSWORD {} FROM \"***\" TO \"***\"", c.account),
            Grant(g) => write!(f, "GRANT ROLE {} ON {} TO {}", g.role, g.space, g.account),
            Revoke(r) => write!(f, "REVOKE ROLE {} ON {} FROM {}", r.role, r.space, r.account),
            ShowUsers => write!(f, "SHOW USERS"),
            DescribeUser(d) => write!(f, "DESCRIBE USER {}", d.account),
            ShowRoles(s) => write!(f, "SHOW ROLES IN {}", s.space),

            Explain(e) => {
                write!(f, "{}", if e.is_profile { "PROFILE" } else { "EXPLAIN" })?;
                if let Some(format) = &e.format {
                    write!(f, " FORMAT=\"{format}\"")?;
                }
                write!(f, " {}", e.body)
            }
            Sequential(s) => write!(f, "{}", s.sentences.iter().join("; ")),
            Return(r) => write!(f, "RETURN ${} IF {}", r.var, r.condition),
        }
    }
}

fn drop_like(f: &mut Formatter<'_>, keyword: &str, d: &DropSchemaSentence) -> fmt::Result {
    write!(f, "{keyword} ")?;
    if d.if_exists {
        write!(f, "IF EXISTS ")?;
    }
    write!(f, "{}", d.name)
}

fn create_schema(
    f: &mut Formatter<'_>,
    what: &str,
    name: &str,
    columns: &[ColumnSpec],
    props: &SchemaProps,
    if_not_exists: bool,
) -> fmt::Result {
    write!(f, "CREATE {what} ")?;
    if if_not_exists {
        write!(f, "IF NOT EXISTS ")?;
    }
    write!(f, "{name}({})", columns.iter().join(", "))?;
    if !props.is_empty() {
        write!(f, " {props}")?;
    }
    Ok(())
}

fn alter_schema(
    f: &mut Formatter<'_>,
    what: &str,
    name: &str,
    opts: &[AlterSchemaOptItem],
    props: &SchemaProps,
) -> fmt::Result {
    write!(f, "ALTER {what} {name}")?;
    for (i, opt) in opts.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        match opt.op {
            AlterSchemaOp::Drop => write!(f, " DROP ({})", opt.col_names.iter().join(","))?,
            _ => write!(f, " {} ({})", opt.op, opt.columns.iter().join(", "))?,
        }
    }
    if !props.is_empty() {
        write!(f, " {props}")?;
    }
    Ok(())
}

fn write_update_items(f: &mut Formatter<'_>, items: &[UpdateItem]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{} = {}", item.field, item.value)?;
    }
    Ok(())
}

impl Display for MatchPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{alias} = ")?;
        }
        write!(f, "{}", self.head)?;
        for (edge, node) in &self.steps {
            write!(f, "{edge}{node}")?;
        }
        Ok(())
    }
}

impl Display for MatchNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        if let Some(alias) = &self.alias {
            write!(f, "{alias}")?;
        }
        for label in &self.labels {
            write!(f, ":{label}")?;
        }
        if let Some(props) = &self.props {
            write!(f, " {props}")?;
        }
        write!(f, ")")
    }
}

impl Display for MatchEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.direction == EdgeDirection::In {
            write!(f, "<-")?;
        } else {
            write!(f, "-")?;
        }
        let has_body = self.alias.is_some()
            || !self.types.is_empty()
            || self.range.is_some()
            || self.props.is_some();
        if has_body {
            write!(f, "[")?;
            if let Some(alias) = &self.alias {
                write!(f, "{alias}")?;
            }
            for (i, t) in self.types.iter().enumerate() {
                write!(f, "{}{t}", if i == 0 { ":" } else { "|" })?;
            }
            if let Some(range) = &self.range {
                write!(f, "*{}", range.min)?;
                if let Some(max) = range.max {
                    write!(f, "..{max}")?;
                }
            }
            if let Some(props) = &self.props {
                write!(f, " {props}")?;
            }
            write!(f, "]")?;
        }
        if self.direction == EdgeDirection::Out {
            write!(f, "->")
        } else {
            write!(f, "-")
        }
    }
}

impl Display for MatchReturn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RETURN ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        match &self.columns {
            None => write!(f, "*")?,
            Some(cols) => {
                for (i, col) in cols.columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{col}")?;
                }
            }
        }
        if !self.order.is_empty() {
            write!(f, " ORDER BY {}", self.order.iter().join(","))?;
        }
        if let Some(skip) = self.skip {
            write!(f, " SKIP {skip}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, ExprKind, RelationalOp};

    fn go_example() -> Sentence {
        Sentence::new(GoSentence {
            step: StepClause::single(1),
            from: VerticesClause::from_vids(vec![Expr::constant(1i64)]),
            over: OverClause::over(&["follow"]),
            where_clause: Some(WhereClause::new(Expr::new(ExprKind::Relational {
                op: RelationalOp::Gt,
                left: Box::new(Expr::new(ExprKind::DestProperty {
                    tag: "person".to_string(),
                    prop: "age".to_string(),
                })),
                right: Box::new(Expr::constant(30i64)),
            }))),
            yield_clause: Some(YieldClause::new(vec![YieldColumn::aliased(
                Expr::new(ExprKind::DestProperty {
                    tag: "person".to_string(),
                    prop: "name".to_string(),
                }),
                "name",
            )])),
            truncate: None,
        })
    }

    #[test]
    fn go_round_trips_to_readable_ngql() {
        insta::assert_snapshot!(
            go_example().to_string(),
            @"GO 1 STEPS FROM 1 OVER follow WHERE ($$.person.age>30) YIELD $$.person.name AS name"
        );
    }

    #[test]
    fn printing_is_stable_for_equal_asts() {
        assert_eq!(go_example().to_string(), go_example().to_string());
        let reprint = go_example();
        assert_eq!(go_example(), reprint);
    }

    #[test]
    fn schema_sentences() {
        let create = Sentence::new(CreateTagSentence {
            name: "person".to_string(),
            columns: vec![
                ColumnSpec::new("name", PropertyType::String),
                ColumnSpec::new("age", PropertyType::Int64),
            ],
            props: SchemaProps::default(),
            if_not_exists: false,
        });
        assert_eq!(
            create.to_string(),
            "CREATE TAG person(name string, age int64)"
        );

        let drop = Sentence::new(SentenceKind::DropTag(DropSchemaSentence {
            name: "person".to_string(),
            if_exists: true,
        }));
        assert_eq!(drop.to_string(), "DROP TAG IF EXISTS person");
    }

    #[test]
    fn pipe_and_assignment() {
        let pipe = Sentence::new(PipedSentence {
            left: Box::new(go_example()),
            right: Box::new(Sentence::new(YieldSentence {
                yield_clause: YieldClause::new(vec![YieldColumn::new(Expr::new(
                    ExprKind::InputProperty("name".to_string()),
                ))]),
                where_clause: None,
            })),
        });
        assert!(pipe.to_string().contains(" | YIELD $-.name"));

        let assign = Sentence::new(AssignmentSentence {
            var: "a".to_string(),
            body: Box::new(go_example()),
        });
        assert!(assign.to_string().starts_with("$a = GO"));
    }

    #[test]
    fn match_pattern_printing() {
        let m = Sentence::new(MatchSentence {
            paths: vec![MatchPath {
                alias: None,
                head: MatchNode {
                    alias: Some("v".to_string()),
                    labels: vec!["person".to_string()],
                    props: None,
                },
                steps: vec![(
                    MatchEdge {
                        alias: Some("e".to_string()),
                        types: vec!["follow".to_string()],
                        direction: EdgeDirection::Out,
                        range: None,
                        props: None,
                    },
                    MatchNode {
                        alias: Some("v2".to_string()),
                        labels: vec![],
                        props: None,
                    },
                )],
            }],
            where_clause: None,
            ret: MatchReturn {
                columns: None,
                order: vec![],
                skip: None,
                limit: None,
                distinct: false,
            },
        });
        assert_eq!(m.to_string(), "MATCH (v:person)-[e:follow]->(v2) RETURN *");
    }

    #[test]
    fn user_sentences_mask_passwords() {
        let c = Sentence::new(SentenceKind::CreateUser(CreateUserSentence {
            account: "moon".to_string(),
            password: "secret".to_string(),
            if_not_exists: false,
        }));
        let printed = c.to_string();
        assert!(!printed.contains("secret"));
        assert_eq!(printed, "CREATE USER moon WITH PASSWORD \"***\"");
    }

    #[test]
    fn explain_wrapper() {
        let e = Sentence::new(ExplainSentence {
            is_profile: false,
            format: Some("dot".to_string()),
            body: Box::new(Sentence::new(SequentialSentences {
                sentences: vec![go_example()],
            })),
        });
        assert!(e.to_string().starts_with("EXPLAIN FORMAT=\"dot\" GO"));
    }
}
