//! Validators for user and role management. The authority rules live in
//! the permission precheck; these validate the arguments themselves.

use ngqlc_ast::error::{Error, Result};
use ngqlc_ast::stmt::SentenceKind;
use ngqlc_ast::types::ValueType;

use super::{Outcome, Vctx};
use crate::ir::PlanNodeKind;

const MAX_PASSWORD_LEN: usize = 24;

fn check_account(account: &str) -> Result<()> {
    if account.is_empty() {
        return Err(Error::semantic("Account cannot be empty."));
    }
    if account.len() > 16 {
        return Err(Error::semantic("Account exceeds maximum length 16."));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.len() > MAX_PASSWORD_LEN {
        return Err(Error::semantic(format!(
            "Password exceeds maximum length {MAX_PASSWORD_LEN}."
        )));
    }
    Ok(())
}

pub(crate) fn validate_acl(kind: &SentenceKind, vctx: &mut Vctx) -> Result<Outcome> {
    use SentenceKind::*;
    match kind {
        CreateUser(c) => {
            check_account(&c.account)?;
            check_password(&c.password)?;
            Ok(vctx.single_node(
                PlanNodeKind::CreateUser {
                    account: c.account.clone(),
                    if_not_exists: c.if_not_exists,
                },
                &[],
            ))
        }
        DropUser(d) => {
            check_account(&d.account)?;
            Ok(vctx.single_node(
                PlanNodeKind::DropUser {
                    account: d.account.clone(),
                    if_exists: d.if_exists,
                },
                &[],
            ))
        }
        AlterUser(a) => {
            check_account(&a.account)?;
            check_password(&a.password)?;
            Ok(vctx.single_node(
                PlanNodeKind::UpdateUser {
                    account: a.account.clone(),
                },
                &[],
            ))
        }
        ChangePassword(c) => {
            check_account(&c.account)?;
            check_password(&c.new_password)?;
            Ok(vctx.single_node(
                PlanNodeKind::ChangePassword {
                    account: c.account.clone(),
                },
                &[],
            ))
        }
        Grant(g) => {
            check_account(&g.account)?;
            vctx.qctx.catalog.space_by_name(&g.space)?;
            Ok(vctx.single_node(
                PlanNodeKind::GrantRole {
                    account: g.account.clone(),
                    space: g.space.clone(),
                    role: g.role,
                },
                &[],
            ))
        }
        Revoke(r) => {
            check_account(&r.account)?;
            vctx.qctx.catalog.space_by_name(&r.space)?;
            Ok(vctx.single_node(
                PlanNodeKind::RevokeRole {
                    account: r.account.clone(),
                    space: r.space.clone(),
                    role: r.role,
                },
                &[],
            ))
        }
        ShowUsers => Ok(vctx.single_node(
            PlanNodeKind::ShowUsers,
            &[("Account", ValueType::String)],
        )),
        DescribeUser(d) => {
            check_account(&d.account)?;
            Ok(vctx.single_node(
                PlanNodeKind::DescribeUser {
                    account: d.account.clone(),
                },
                &[
                    ("role", ValueType::String),
                    ("space", ValueType::String),
                ],
            ))
        }
        ShowRoles(s) => {
            vctx.qctx.catalog.space_by_name(&s.space)?;
            Ok(vctx.single_node(
                PlanNodeKind::ShowRoles {
                    space: s.space.clone(),
                },
                &[
                    ("Account", ValueType::String),
                    ("Role Type", ValueType::String),
                ],
            ))
        }
        other => Err(Error::internal(format!(
            "not an ACL sentence: {}",
            other.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ngqlc_ast::error::ErrorCode;
    use ngqlc_ast::stmt::user::*;
    use ngqlc_ast::stmt::Sentence;

    use super::*;
    use crate::catalog::{MemCatalog, SpaceDesc};
    use crate::context::QueryContext;
    use crate::semantic::validate;
    use crate::session::Session;

    fn ctx(user: &str) -> QueryContext {
        let mut cat = MemCatalog::new();
        cat.add_space(SpaceDesc::new(1, "nba"));
        cat.add_god("root");
        cat.grant_role("nba", "dba", RoleType::Admin);
        cat.grant_role("nba", "moon", RoleType::User);
        QueryContext::new(Arc::new(cat), Session::new(user))
    }

    #[test]
    fn create_user_validates_account_and_password() {
        let mut qctx = ctx("root");
        let create = |account: &str, password: &str| {
            Sentence::new(SentenceKind::CreateUser(CreateUserSentence {
                account: account.to_string(),
                password: password.to_string(),
                if_not_exists: false,
            }))
        };
        let plan = validate(&create("u1", "pw"), &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::CreateUser { .. }
        ));

        let err = validate(&create("", "pw"), &mut qctx).unwrap_err();
        assert_eq!(err.message, "Account cannot be empty.");

        let err = validate(&create("a_very_long_account", "pw"), &mut qctx).unwrap_err();
        assert_eq!(err.message, "Account exceeds maximum length 16.");

        let err = validate(&create("u1", "p".repeat(25).as_str()), &mut qctx).unwrap_err();
        assert_eq!(err.message, "Password exceeds maximum length 24.");
    }

    #[test]
    fn user_management_is_god_only() {
        let mut qctx = ctx("moon");
        let create = Sentence::new(SentenceKind::CreateUser(CreateUserSentence {
            account: "u1".to_string(),
            password: "pw".to_string(),
            if_not_exists: false,
        }));
        let err = validate(&create, &mut qctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E_BAD_PERMISSION);

        let drop = Sentence::new(SentenceKind::DropUser(DropUserSentence {
            account: "u1".to_string(),
            if_exists: true,
        }));
        let err = validate(&drop, &mut qctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E_BAD_PERMISSION);

        // but anyone may change their own password
        let change = Sentence::new(SentenceKind::ChangePassword(ChangePasswordSentence {
            account: "moon".to_string(),
            old_password: "old".to_string(),
            new_password: "new".to_string(),
        }));
        let plan = validate(&change, &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::ChangePassword { .. }
        ));
    }

    #[test]
    fn drop_alter_and_describe_as_god() {
        let mut qctx = ctx("root");
        let drop = Sentence::new(SentenceKind::DropUser(DropUserSentence {
            account: "moon".to_string(),
            if_exists: false,
        }));
        assert!(matches!(
            validate(&drop, &mut qctx).unwrap().root_node().unwrap().kind,
            PlanNodeKind::DropUser { .. }
        ));

        let alter = Sentence::new(SentenceKind::AlterUser(AlterUserSentence {
            account: "moon".to_string(),
            password: "new".to_string(),
        }));
        assert!(matches!(
            validate(&alter, &mut qctx).unwrap().root_node().unwrap().kind,
            PlanNodeKind::UpdateUser { .. }
        ));

        let describe = Sentence::new(SentenceKind::DescribeUser(DescribeUserSentence {
            account: "moon".to_string(),
        }));
        assert!(validate(&describe, &mut qctx).is_ok());

        let show = Sentence::new(SentenceKind::ShowUsers);
        let plan = validate(&show, &mut qctx).unwrap();
        assert_eq!(plan.root_node().unwrap().col_names, vec!["Account"]);
    }

    fn grant(role: RoleType, account: &str, space: &str) -> Sentence {
        Sentence::new(SentenceKind::Grant(GrantSentence {
            role,
            account: account.to_string(),
            space: space.to_string(),
        }))
    }

    #[test]
    fn grant_requires_strictly_outranking_role() {
        // ADMIN in the space may hand out USER
        let mut qctx = ctx("dba");
        let plan = validate(&grant(RoleType::User, "moon", "nba"), &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::GrantRole {
                role: RoleType::User,
                ..
            }
        ));

        // ...but not a role equal to its own
        let err = validate(&grant(RoleType::Admin, "moon", "nba"), &mut qctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E_BAD_PERMISSION);

        // ...and never GOD
        let err = validate(&grant(RoleType::God, "moon", "nba"), &mut qctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E_BAD_PERMISSION);

        // USER holds no authority to grant at its own level
        let mut qctx = ctx("moon");
        let err = validate(&grant(RoleType::User, "sun", "nba"), &mut qctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E_BAD_PERMISSION);

        // GOD may grant anywhere, but the space must exist
        let mut qctx = ctx("root");
        assert!(validate(&grant(RoleType::Admin, "moon", "nba"), &mut qctx).is_ok());
        let err = validate(&grant(RoleType::User, "moon", "ghost"), &mut qctx).unwrap_err();
        assert_eq!(err.message, "space `ghost' not found");
    }

    #[test]
    fn revoke_follows_the_same_rule() {
        let mut qctx = ctx("dba");
        let revoke = |role: RoleType| {
            Sentence::new(SentenceKind::Revoke(RevokeSentence {
                role,
                account: "moon".to_string(),
                space: "nba".to_string(),
            }))
        };
        let plan = validate(&revoke(RoleType::User), &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::RevokeRole {
                role: RoleType::User,
                ..
            }
        ));
        let err = validate(&revoke(RoleType::Admin), &mut qctx).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E_BAD_PERMISSION);
    }

    #[test]
    fn show_roles_names_its_space() {
        let mut qctx = ctx("root");
        let show = Sentence::new(SentenceKind::ShowRoles(ShowRolesSentence {
            space: "nba".to_string(),
        }));
        let plan = validate(&show, &mut qctx).unwrap();
        assert!(matches!(
            plan.root_node().unwrap().kind,
            PlanNodeKind::ShowRoles { .. }
        ));
        let missing = Sentence::new(SentenceKind::ShowRoles(ShowRolesSentence {
            space: "ghost".to_string(),
        }));
        let err = validate(&missing, &mut qctx).unwrap_err();
        assert_eq!(err.message, "space `ghost' not found");
    }
}
