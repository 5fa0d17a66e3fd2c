//! Page identifiers and the role permission table.
//!
//! Every navigable page is a [`Page`] variant; the sidebar menu and the
//! per-handler access guard both derive from the same static table, so a
//! page a role cannot reach is never offered and never served.

use flash_pagamentos_core::Role;

/// Error returned when a role may not access a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("role '{role}' may not access '{page}'", role = .role.as_str(), page = .page.title())]
pub struct AccessDenied {
    /// The role that was refused.
    pub role: Role,
    /// The page it asked for.
    pub page: Page,
}

/// A navigable portal page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Landing page with the marketing copy.
    Home,
    /// The assistant ("Fazer Pedido") chat page.
    Order,
    /// Customer creation and listing.
    ClientCreate,
    /// Payment aggregates overview.
    Dashboard,
    /// Cobrança creation and listing.
    Financial,
    /// Payment link creation and listing.
    PaymentLink,
    /// Subaccount (parceiro) creation and listing.
    Partner,
    /// Webhook management.
    Webhook,
}

/// Static descriptor for a page: menu title, route path and menu icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    pub page: Page,
    pub title: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
}

/// A sidebar menu entry rendered for the current session.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub title: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

/// Menu order for the admin role; every other role's list is a subset of
/// this one (checked in tests, not enforced at runtime).
const ALL_PAGES: [Page; 8] = [
    Page::Home,
    Page::Order,
    Page::ClientCreate,
    Page::Dashboard,
    Page::Financial,
    Page::PaymentLink,
    Page::Partner,
    Page::Webhook,
];

const CLIENTE_PAGES: [Page; 2] = [Page::Home, Page::Order];
const PARCEIRO_PAGES: [Page; 3] = [Page::Home, Page::Order, Page::ClientCreate];

impl Page {
    /// All pages in menu order.
    #[must_use]
    pub const fn all() -> &'static [Page] {
        &ALL_PAGES
    }

    /// The static descriptor for this page.
    #[must_use]
    pub const fn descriptor(self) -> PageDescriptor {
        match self {
            Self::Home => PageDescriptor {
                page: self,
                title: "Início",
                path: "/",
                icon: "house-fill",
            },
            Self::Order => PageDescriptor {
                page: self,
                title: "Fazer Pedido",
                path: "/pedido",
                icon: "cart-fill",
            },
            Self::ClientCreate => PageDescriptor {
                page: self,
                title: "Criar Cliente",
                path: "/clientes",
                icon: "person-fill",
            },
            Self::Dashboard => PageDescriptor {
                page: self,
                title: "Dashboard",
                path: "/dashboard",
                icon: "cash-stack",
            },
            Self::Financial => PageDescriptor {
                page: self,
                title: "Financeiro",
                path: "/financeiro",
                icon: "link",
            },
            Self::PaymentLink => PageDescriptor {
                page: self,
                title: "Link de Pagamento",
                path: "/links",
                icon: "people-fill",
            },
            Self::Partner => PageDescriptor {
                page: self,
                title: "Parceiro",
                path: "/parceiros",
                icon: "code-slash",
            },
            Self::Webhook => PageDescriptor {
                page: self,
                title: "Webhook",
                path: "/webhooks",
                icon: "grid",
            },
        }
    }

    /// The page's menu title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        self.descriptor().title
    }

    /// The page's route path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        self.descriptor().path
    }

    /// The ordered list of pages a role may access.
    ///
    /// There is no default-permissive fallback: a role outside this table
    /// would resolve to nothing at all, and an empty list renders an empty
    /// menu.
    #[must_use]
    pub const fn allowed_for(role: Role) -> &'static [Page] {
        match role {
            Role::Admin => &ALL_PAGES,
            Role::Parceiro => &PARCEIRO_PAGES,
            Role::Cliente => &CLIENTE_PAGES,
        }
    }

    /// Fail-closed access check every page handler runs before its body.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] when the role's allowed list does not
    /// contain this page.
    pub fn authorize(self, role: Role) -> Result<(), AccessDenied> {
        if Self::allowed_for(role).contains(&self) {
            Ok(())
        } else {
            Err(AccessDenied { role, page: self })
        }
    }
}

/// The ordered descriptors a role's menu is built from.
#[must_use]
pub fn resolve_allowed_pages(role: Role) -> Vec<PageDescriptor> {
    Page::allowed_for(role)
        .iter()
        .map(|page| page.descriptor())
        .collect()
}

/// Build the sidebar links for a session, marking the active page.
#[must_use]
pub fn nav_links(role: Role, active: Page) -> Vec<NavLink> {
    Page::allowed_for(role)
        .iter()
        .map(|page| {
            let descriptor = page.descriptor();
            NavLink {
                title: descriptor.title,
                path: descriptor.path,
                icon: descriptor.icon,
                active: *page == active,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cliente_sees_exactly_home_and_order() {
        assert_eq!(Page::allowed_for(Role::Cliente), &[Page::Home, Page::Order]);
    }

    #[test]
    fn parceiro_adds_client_create() {
        assert_eq!(
            Page::allowed_for(Role::Parceiro),
            &[Page::Home, Page::Order, Page::ClientCreate]
        );
    }

    #[test]
    fn admin_sees_all_eight_pages() {
        let pages = Page::allowed_for(Role::Admin);
        assert_eq!(pages.len(), 8);
        assert_eq!(pages, Page::all());
    }

    #[test]
    fn admin_list_is_a_superset_of_every_other_role() {
        let admin = Page::allowed_for(Role::Admin);
        for role in [Role::Parceiro, Role::Cliente] {
            for page in Page::allowed_for(role) {
                assert!(
                    admin.contains(page),
                    "admin list is missing {page:?} allowed for {role:?}"
                );
            }
        }
    }

    #[test]
    fn authorize_is_fail_closed() {
        assert!(Page::Dashboard.authorize(Role::Admin).is_ok());
        assert!(Page::Dashboard.authorize(Role::Cliente).is_err());
        assert!(Page::ClientCreate.authorize(Role::Cliente).is_err());
        assert!(Page::ClientCreate.authorize(Role::Parceiro).is_ok());
        assert!(Page::Webhook.authorize(Role::Parceiro).is_err());
    }

    #[test]
    fn unknown_role_string_never_reaches_the_table() {
        // The table is keyed by the Role enum; an unrecognized role name
        // fails at parse time, before any page can be resolved.
        assert!("gerente".parse::<flash_pagamentos_core::Role>().is_err());
    }

    #[test]
    fn cliente_menu_has_two_entries_and_never_offers_dashboard() {
        let links = nav_links(Role::Cliente, Page::Home);
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.path != Page::Dashboard.path()));
        assert!(links[0].active);
        assert!(!links[1].active);
    }

    #[test]
    fn resolve_allowed_pages_keeps_menu_order() {
        let pages = resolve_allowed_pages(Role::Admin);
        let titles: Vec<&str> = pages.iter().map(|p| p.title).collect();
        assert_eq!(
            titles,
            [
                "Início",
                "Fazer Pedido",
                "Criar Cliente",
                "Dashboard",
                "Financeiro",
                "Link de Pagamento",
                "Parceiro",
                "Webhook"
            ]
        );
    }

    #[test]
    fn every_page_has_a_distinct_path() {
        let mut paths: Vec<&str> = Page::all().iter().map(|p| p.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), 8);
    }

    #[test]
    fn access_denied_message_names_role_and_page() {
        let err = Page::Dashboard.authorize(Role::Cliente).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cliente"));
        assert!(message.contains("Dashboard"));
    }
}
